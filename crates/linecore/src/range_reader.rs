use std::io::{Read, Seek, SeekFrom};

use crate::error::{CoreError, Phase, Result};
use crate::line_index::LineIndex;

/// Reads inclusive line ranges from a seekable source with one seek and one
/// bounded read per call. The reader owns the handle for as long as it lives.
#[derive(Debug)]
pub struct RangeReader<R> {
    index: LineIndex,
    source: R,
}

impl<R: Read + Seek> RangeReader<R> {
    pub fn new(index: LineIndex, source: R) -> Self {
        Self { index, source }
    }

    pub fn index(&self) -> &LineIndex {
        &self.index
    }

    pub fn line_count(&self) -> u32 {
        self.index.line_count()
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    pub(crate) fn source_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Lines `start_line..=end_line` (1-based). An `end_line` past the last line
    /// is clamped to it.
    pub fn read_lines(&mut self, start_line: u32, end_line: u32) -> Result<Vec<String>> {
        if start_line == 0 || end_line == 0 || start_line > end_line {
            return Err(CoreError::InvalidRange {
                start: start_line,
                end: end_line,
            });
        }

        let mut end_line = end_line;
        let max_line = self.index.line_count();
        if end_line > max_line {
            log::warn!(
                "End line {} is past the end of file, clamping to {}",
                end_line,
                max_line
            );
            end_line = max_line;
        }
        if start_line > end_line {
            return Err(CoreError::InvalidRange {
                start: start_line,
                end: end_line,
            });
        }

        let (from, to) = self.index.span(start_line, end_line);
        self.source
            .seek(SeekFrom::Start(from))
            .map_err(CoreError::io(Phase::Read))?;

        // The final span can be one byte longer than the file when the last line
        // has no newline; a short read there is expected.
        let mut buf = Vec::with_capacity((to - from) as usize);
        (&mut self.source)
            .take(to - from)
            .read_to_end(&mut buf)
            .map_err(CoreError::io(Phase::Read))?;

        if matches!(buf.last(), Some(b'\n') | Some(b'\0')) {
            buf.pop();
        }

        let mut lines = Vec::with_capacity((end_line - start_line + 1) as usize);
        for raw in buf.split(|b| *b == b'\n') {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            lines.push(String::from_utf8_lossy(raw).into_owned());
        }
        Ok(lines)
    }
}
