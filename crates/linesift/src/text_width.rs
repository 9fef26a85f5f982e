//! Display-width helpers for fitting arbitrary file lines into terminal cells.
//!
//! Lines come straight out of user files, so they may hold tabs, control
//! bytes, wide CJK text or emoji sequences. Widths are measured per grapheme
//! cluster so a cluster is never cut in half.

use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: &str = "…";

/// Display width of one grapheme cluster. Control characters take no cells.
pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.chars().all(char::is_control) {
        return 0;
    }
    grapheme.width()
}

pub fn str_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

/// Replace tabs with spaces up to the next tab stop.
pub fn expand_tabs(text: &str, tab_size: usize) -> Cow<'_, str> {
    if !text.contains('\t') {
        return Cow::Borrowed(text);
    }
    let tab_size = tab_size.max(1);
    let mut out = String::with_capacity(text.len() + tab_size);
    let mut col = 0;
    for grapheme in text.graphemes(true) {
        if grapheme == "\t" {
            let pad = tab_size - col % tab_size;
            out.extend(std::iter::repeat(' ').take(pad));
            col += pad;
        } else {
            out.push_str(grapheme);
            col += grapheme_width(grapheme);
        }
    }
    Cow::Owned(out)
}

/// Cut `text` so it fits in `max_width` cells, ending in an ellipsis when
/// anything was dropped.
pub fn clip_to_width(text: &str, max_width: usize) -> Cow<'_, str> {
    if str_width(text) <= max_width {
        return Cow::Borrowed(text);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_width - str_width(ELLIPSIS);
    let mut width = 0;
    let mut end = 0;
    for (offset, grapheme) in text.grapheme_indices(true) {
        let w = grapheme_width(grapheme);
        if width + w > budget {
            break;
        }
        width += w;
        end = offset + grapheme.len();
    }
    Cow::Owned(format!("{}{}", &text[..end], ELLIPSIS))
}

/// Tabs expanded, then clipped to the available cells.
pub fn fit_line(text: &str, tab_size: usize, max_width: usize) -> String {
    let expanded = expand_tabs(text, tab_size);
    clip_to_width(&expanded, max_width).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_width() {
        assert_eq!(str_width("Hello"), 5);
        assert_eq!(str_width("こんにちは"), 10);
        assert_eq!(str_width("Hello世界"), 9);
        assert_eq!(str_width("a\u{7}b"), 2);
    }

    #[test]
    fn test_expand_tabs() {
        assert!(matches!(expand_tabs("no tabs", 4), Cow::Borrowed(_)));
        assert_eq!(expand_tabs("a\tb", 4), "a   b");
        assert_eq!(expand_tabs("\tx", 4), "    x");
        assert_eq!(expand_tabs("世\tx", 4), "世  x");
    }

    #[test]
    fn test_clip_keeps_short_lines() {
        assert_eq!(clip_to_width("ls -la", 10), "ls -la");
        assert_eq!(clip_to_width("", 0), "");
    }

    #[test]
    fn test_clip_long_lines() {
        assert_eq!(clip_to_width("git commit --amend", 8), "git com…");
        assert_eq!(str_width(&clip_to_width("git commit --amend", 8)), 8);
        assert_eq!(clip_to_width("abc", 0), "");
    }

    #[test]
    fn test_clip_never_splits_wide_characters() {
        let clipped = clip_to_width("日本語のテキスト", 6);
        assert_eq!(clipped, "日本…");
        assert!(str_width(&clipped) <= 6);
    }

    #[test]
    fn test_fit_line() {
        assert_eq!(fit_line("\tcargo build --release", 4, 12), "    cargo b…");
    }
}
