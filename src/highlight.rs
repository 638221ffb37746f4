//! Colors for the display sequence, and the matching-brace scan the
//! renderer runs before colourisation.

use crate::unicode::UnicodeBuffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Default,
    Black,
    Red,
    Green,
    Brown,
    Blue,
    Magenta,
    Cyan,
    LightGray,
    Gray,
    BrightRed,
    BrightGreen,
    Yellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    White,
    /// Used for a brace whose counterpart is mismatched.
    Error,
}

pub fn ansi_color(color: Color) -> &'static str {
    match color {
        Color::Default => "\x1b[0m",
        Color::Black => "\x1b[0;22;30m",
        Color::Red => "\x1b[0;22;31m",
        Color::Green => "\x1b[0;22;32m",
        Color::Brown => "\x1b[0;22;33m",
        Color::Blue => "\x1b[0;22;34m",
        Color::Magenta => "\x1b[0;22;35m",
        Color::Cyan => "\x1b[0;22;36m",
        Color::LightGray => "\x1b[0;22;37m",
        Color::Gray => "\x1b[0;1;30m",
        Color::BrightRed => "\x1b[0;1;31m",
        Color::BrightGreen => "\x1b[0;1;32m",
        Color::Yellow => "\x1b[0;1;33m",
        Color::BrightBlue => "\x1b[0;1;34m",
        Color::BrightMagenta => "\x1b[0;1;35m",
        Color::BrightCyan => "\x1b[0;1;36m",
        Color::White => "\x1b[0;1;37m",
        Color::Error => "\x1b[0;1;37;41m",
    }
}

/// If the code point at `pos` is a brace, scan toward its expected match
/// and return `(match index, mismatch seen)`. The balance counts the
/// closer/opener pair of the same kind in both scan directions; any
/// other-kind brace crossed on the way is tallied separately and turns
/// the highlight into the error color.
pub fn find_matching_brace(data: &UnicodeBuffer, pos: usize) -> Option<(usize, bool)> {
    if pos >= data.len() {
        return None;
    }
    let (scan_direction, part1, part2): (isize, char, char) = match data[pos] {
        '}' => (-1, '}', '{'),
        ']' => (-1, ']', '['),
        ')' => (-1, ')', '('),
        '{' => (1, '}', '{'),
        '[' => (1, ']', '['),
        '(' => (1, ')', '('),
        _ => return None,
    };

    let mut unmatched = scan_direction;
    let mut unmatched_other = 0isize;
    let mut i = pos as isize + scan_direction;
    while i >= 0 && (i as usize) < data.len() {
        let ch = data[i as usize];
        if ch == '}' || ch == ']' || ch == ')' {
            if ch == part1 {
                unmatched -= 1;
            } else {
                unmatched_other -= 1;
            }
        } else if ch == '{' || ch == '[' || ch == '(' {
            if ch == part2 {
                unmatched += 1;
            } else {
                unmatched_other += 1;
            }
        }
        if unmatched == 0 {
            return Some((i as usize, unmatched_other != 0));
        }
        i += scan_direction;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_on_a_brace() {
        let buf = UnicodeBuffer::from_str("hello");
        assert_eq!(find_matching_brace(&buf, 1), None);
        assert_eq!(find_matching_brace(&buf, 99), None);
    }

    #[test]
    fn test_forward_match() {
        let buf = UnicodeBuffer::from_str("foo()");
        assert_eq!(find_matching_brace(&buf, 3), Some((4, false)));
    }

    #[test]
    fn test_backward_match() {
        let buf = UnicodeBuffer::from_str("foo(bar)");
        assert_eq!(find_matching_brace(&buf, 7), Some((3, false)));
    }

    #[test]
    fn test_nested_same_kind() {
        let buf = UnicodeBuffer::from_str("((a))");
        assert_eq!(find_matching_brace(&buf, 0), Some((4, false)));
        assert_eq!(find_matching_brace(&buf, 1), Some((3, false)));
        assert_eq!(find_matching_brace(&buf, 4), Some((0, false)));
    }

    #[test]
    fn test_mismatched_other_kind_flags_error() {
        let buf = UnicodeBuffer::from_str("foo(])");
        let (idx, error) = find_matching_brace(&buf, 3).unwrap();
        assert_eq!(idx, 5);
        assert!(error);
    }

    #[test]
    fn test_balanced_other_kind_is_clean() {
        let buf = UnicodeBuffer::from_str("([x])");
        assert_eq!(find_matching_brace(&buf, 0), Some((4, false)));
    }

    #[test]
    fn test_unmatched_brace() {
        let buf = UnicodeBuffer::from_str("foo(");
        assert_eq!(find_matching_brace(&buf, 3), None);
    }

    #[test]
    fn test_error_color_is_distinct() {
        assert_ne!(ansi_color(Color::BrightRed), ansi_color(Color::Error));
    }
}
