//! The loaded buffer of lines and the 5-line view over it.

use crate::error::{CoreError, Result};

/// Most lines held in memory at once.
pub const BUFFER_CAPACITY: u32 = 30;
/// Lines visible at once: two before the selection, the selection, two after.
pub const WINDOW_HEIGHT: usize = 5;
/// Lines shown above the selection when the buffer allows it.
pub const CONTEXT_BEFORE: usize = 2;

/// A contiguous run of lines starting at absolute line `start_line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    start_line: u32,
    lines: Vec<String>,
    marked: Vec<bool>,
}

impl LineBuffer {
    pub fn new(start_line: u32, lines: Vec<String>, marked: Vec<bool>) -> Self {
        debug_assert_eq!(lines.len(), marked.len());
        Self {
            start_line,
            lines,
            marked,
        }
    }

    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    /// Last absolute line held, inclusive.
    pub fn end_line(&self) -> u32 {
        self.start_line + self.lines.len() as u32 - 1
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_marked(&self, buf_index: usize) -> bool {
        self.marked.get(buf_index).copied().unwrap_or(false)
    }

    pub(crate) fn set_marked(&mut self, buf_index: usize, marked: bool) {
        if let Some(flag) = self.marked.get_mut(buf_index) {
            *flag = marked;
        }
    }
}

/// Buffer indices of the visible window; `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpan {
    pub start: usize,
    pub selected: usize,
    pub end: usize,
}

impl WindowSpan {
    /// Fit a window starting near `requested_start` into a buffer of `buffer_len`
    /// lines, and check that `selected` is visible in it.
    ///
    /// Full buffers clamp the start to `[0, buffer_len - 5]`; shorter ones always
    /// start at 0.
    pub fn fit(buffer_len: usize, requested_start: isize, selected: usize) -> Result<Self> {
        let start = if buffer_len >= WINDOW_HEIGHT {
            let last_start = (buffer_len - WINDOW_HEIGHT) as isize;
            requested_start.clamp(0, last_start) as usize
        } else {
            0
        };

        if buffer_len == 0
            || selected < start
            || selected >= start + WINDOW_HEIGHT
            || selected >= buffer_len
        {
            return Err(CoreError::OutOfBounds {
                selected,
                window_start: start,
                max_index: buffer_len.saturating_sub(1),
            });
        }

        Ok(Self {
            start,
            selected,
            end: (start + WINDOW_HEIGHT).min(buffer_len),
        })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// What the front end renders: the visible lines split around the selection,
/// and one gutter flag per visible line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowView {
    pub before: Vec<String>,
    pub selected: String,
    pub after: Vec<String>,
    pub gutter: Vec<bool>,
    pub selected_line: u32,
}

impl WindowView {
    pub fn new(buffer: &LineBuffer, span: WindowSpan) -> Self {
        let lines = buffer.lines();
        Self {
            before: lines[span.start..span.selected].to_vec(),
            selected: lines[span.selected].clone(),
            after: lines[span.selected + 1..span.end].to_vec(),
            gutter: (span.start..span.end).map(|i| buffer.is_marked(i)).collect(),
            selected_line: buffer.start_line() + span.selected as u32,
        }
    }

    /// Gutter flag of the selected line.
    pub fn selected_marked(&self) -> bool {
        self.gutter.get(self.before.len()).copied().unwrap_or(false)
    }
}
