use std::io::{Read, Seek};

use crate::deletion::DeletionSet;
use crate::error::{CoreError, Result};
use crate::range_reader::RangeReader;
use crate::sampler::LineSampler;
use crate::window::{LineBuffer, WindowSpan, WindowView, BUFFER_CAPACITY, CONTEXT_BEFORE};

/// Lines requested before the anchor when loading a buffer.
const ANCHOR_LEAD: u32 = BUFFER_CAPACITY / 2;

/// Absolute bounds `(start_line, end_line)` of the buffer loaded around `anchor`.
///
/// Up to 15 lines lead the anchor and the rest follow it; when the file edge
/// cuts one side short the other side takes up the slack.
pub fn buffer_bounds(anchor: u32, line_count: u32) -> (u32, u32) {
    let start = anchor.saturating_sub(ANCHOR_LEAD).max(1);
    let end = (start + BUFFER_CAPACITY - 1).min(line_count);
    let start = end.saturating_sub(BUFFER_CAPACITY - 1).max(1);
    (start, end)
}

/// Selection state over one loaded buffer.
#[derive(Debug, Clone)]
pub struct Navigator {
    buffer: LineBuffer,
    buf_select_index: usize,
    anchor_file_line: u32,
    anchor_buf_index: usize,
    span: WindowSpan,
}

impl Navigator {
    /// Load a fresh buffer around a line picked by `sampler`.
    pub fn shuffle<R: Read + Seek>(
        reader: &mut RangeReader<R>,
        sampler: &mut dyn LineSampler,
        deletions: &DeletionSet,
    ) -> Result<Self> {
        let line_count = reader.line_count();
        if line_count == 0 {
            return Err(CoreError::EmptyFile);
        }
        let anchor = sampler.sample(line_count);
        log::debug!("Shuffled to line {} of {}", anchor, line_count);
        Self::around(reader, anchor, deletions)
    }

    /// Load the buffer around a known anchor line.
    pub fn around<R: Read + Seek>(
        reader: &mut RangeReader<R>,
        anchor: u32,
        deletions: &DeletionSet,
    ) -> Result<Self> {
        let line_count = reader.line_count();
        if line_count == 0 {
            return Err(CoreError::EmptyFile);
        }
        if anchor == 0 || anchor > line_count {
            return Err(CoreError::InvalidRange {
                start: anchor,
                end: anchor,
            });
        }

        let (start, end) = buffer_bounds(anchor, line_count);
        let lines = reader.read_lines(start, end)?;
        let marked = deletions.flags_for(start, lines.len());
        let buffer = LineBuffer::new(start, lines, marked);

        let anchor_buf_index = (anchor - start) as usize;
        let span = WindowSpan::fit(
            buffer.len(),
            anchor_buf_index as isize - CONTEXT_BEFORE as isize,
            anchor_buf_index,
        )?;

        Ok(Self {
            buffer,
            buf_select_index: anchor_buf_index,
            anchor_file_line: anchor,
            anchor_buf_index,
            span,
        })
    }

    pub fn move_down(&mut self) -> Result<()> {
        let last = self.buffer.len().saturating_sub(1);
        self.select((self.buf_select_index + 1).min(last))
    }

    pub fn move_up(&mut self) -> Result<()> {
        self.select(self.buf_select_index.saturating_sub(1))
    }

    fn select(&mut self, buf_index: usize) -> Result<()> {
        let span = WindowSpan::fit(
            self.buffer.len(),
            buf_index as isize - CONTEXT_BEFORE as isize,
            buf_index,
        )?;
        self.buf_select_index = buf_index;
        self.span = span;
        Ok(())
    }

    /// Flip the deletion mark of the selected line. Returns the new mark.
    pub fn toggle_delete(&mut self, deletions: &mut DeletionSet) -> bool {
        let line = self.selected_file_line();
        let marked = deletions.toggle(line);
        self.buffer.set_marked(self.buf_select_index, marked);
        marked
    }

    pub fn selected_file_line(&self) -> u32 {
        self.anchor_file_line - self.anchor_buf_index as u32 + self.buf_select_index as u32
    }

    pub fn anchor_file_line(&self) -> u32 {
        self.anchor_file_line
    }

    pub fn buf_select_index(&self) -> usize {
        self.buf_select_index
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn span(&self) -> WindowSpan {
        self.span
    }

    pub fn view(&self) -> WindowView {
        WindowView::new(&self.buffer, self.span)
    }
}
