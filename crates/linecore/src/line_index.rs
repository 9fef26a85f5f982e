//! Byte-offset index over the lines of a file.
//!
//! `offsets[0]` is always 0 and `offsets[i]` is the offset at which line `i + 1`
//! (1-based) starts, so `offsets.len() - 1` is the line count. An unterminated
//! final line is accounted as if it carried a newline; readers clamp the last
//! span to the real end of file.

use std::io::BufRead;

use crate::error::{CoreError, Phase, Result};

const INITIAL_CAPACITY: usize = 32 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    offsets: Vec<u32>,
}

impl LineIndex {
    /// Build the index in one streaming pass.
    ///
    /// Only the first line is checked for UTF-8; this is a sample, not a guarantee
    /// for the rest of the file.
    pub fn build<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut offsets = Vec::with_capacity(INITIAL_CAPACITY);
        offsets.push(0u32);

        let mut pos: u64 = 0;
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(CoreError::io(Phase::Index))?;
            if read == 0 {
                break;
            }

            if offsets.len() == 1 {
                let content = line.strip_suffix(b"\n").unwrap_or(&line[..]);
                if std::str::from_utf8(content).is_err() {
                    log::warn!("First line is not valid UTF-8, skipping file");
                    return Err(CoreError::InvalidEncoding { line: 1 });
                }
            }

            pos += read as u64;
            if line.last() != Some(&b'\n') {
                pos += 1;
            }
            let offset = u32::try_from(pos).map_err(|_| CoreError::FileTooLarge)?;
            offsets.push(offset);
        }

        offsets.shrink_to_fit();
        log::debug!(
            "Indexed {} lines ({} KiB of offsets)",
            offsets.len() - 1,
            offsets.len() * 4 / 1024
        );
        Ok(Self { offsets })
    }

    pub fn line_count(&self) -> u32 {
        (self.offsets.len() - 1) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.line_count() == 0
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// Byte span `[start, end)` covering the 1-based inclusive line range.
    /// Callers validate the range first.
    pub(crate) fn span(&self, start_line: u32, end_line: u32) -> (u64, u64) {
        (
            self.offsets[(start_line - 1) as usize] as u64,
            self.offsets[end_line as usize] as u64,
        )
    }
}
