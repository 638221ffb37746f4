//! Prompt geometry. A prompt may span several lines, wrap, and contain
//! ANSI color escapes (which take no columns). The renderer needs to
//! know where the last prompt line starts and how wide it is, and keeps
//! two mutable fields here (`cursor_row_offset`, `previous_input_len`)
//! to find its way back on the next frame.

use std::io;

use crate::terminal;
use crate::unicode::char_width;

#[derive(Clone, Debug)]
pub struct PromptInfo {
    /// Full prompt text, escape sequences included.
    pub text: Vec<char>,
    /// Visible columns over the whole prompt, newlines aside.
    pub visible_columns: usize,
    /// Rows the prompt occupies beyond the first.
    pub extra_lines: usize,
    /// Column where input starts, on the last prompt row.
    pub indentation: usize,
    /// Index into `text` where the last prompt line begins.
    pub last_line_start: usize,
    pub screen_columns: usize,
    /// Row the cursor was left on, relative to the first prompt row.
    pub cursor_row_offset: usize,
    /// Length of the input drawn on the previous frame.
    pub previous_input_len: usize,
    /// Visible columns of the previously displayed prompt (used when a
    /// dynamic prompt replaces this one).
    pub previous_len: usize,
}

impl PromptInfo {
    pub fn new(prompt: &str, screen_columns: usize) -> PromptInfo {
        let mut info = PromptInfo {
            text: prompt.chars().collect(),
            visible_columns: 0,
            extra_lines: 0,
            indentation: 0,
            last_line_start: 0,
            screen_columns,
            cursor_row_offset: 0,
            previous_input_len: 0,
            previous_len: 0,
        };
        info.recalculate_geometry();
        info
    }

    /// Build a single-line prompt from the last line of `other`, used to
    /// repaint after incremental search hands the display back.
    pub fn from_last_line(other: &PromptInfo) -> PromptInfo {
        let text: String = other.text[other.last_line_start..].iter().collect();
        PromptInfo::new(&text, other.screen_columns)
    }

    /// Scan the prompt text: ANSI color escapes (`ESC ... m`) take no
    /// columns, newlines reset the column and add a row, and overlong
    /// lines wrap.
    pub fn recalculate_geometry(&mut self) {
        let columns = self.screen_columns.max(1);
        let mut x = 0;
        let mut extra_lines = 0;
        let mut visible = 0;
        let mut last_line_start = 0;
        let mut in_escape = false;
        for (i, &ch) in self.text.iter().enumerate() {
            if in_escape {
                if ch == 'm' {
                    in_escape = false;
                }
                continue;
            }
            if ch == '\x1b' {
                in_escape = true;
                continue;
            }
            if ch == '\n' {
                x = 0;
                extra_lines += 1;
                last_line_start = i + 1;
                continue;
            }
            let w = char_width(ch);
            x += w;
            visible += w;
            if x >= columns {
                extra_lines += 1;
                x %= columns;
            }
        }
        self.visible_columns = visible;
        self.extra_lines = extra_lines;
        self.indentation = x;
        self.last_line_start = last_line_start;
    }

    pub fn write(&self) -> io::Result<()> {
        terminal::write_chars(&self.text)
    }
}

/// The prompt shown during incremental search, rebuilt on every
/// keystroke from the direction, the search text and the failing flag.
#[derive(Debug)]
pub struct SearchPrompt {
    pub base: PromptInfo,
    pub search_text: Vec<char>,
    /// -1 searches toward older entries, +1 toward newer ones.
    pub direction: i32,
    pub failed: bool,
}

impl SearchPrompt {
    pub fn new(screen_columns: usize, direction: i32) -> SearchPrompt {
        let mut sp = SearchPrompt {
            base: PromptInfo::new("", screen_columns),
            search_text: Vec::new(),
            direction,
            failed: false,
        };
        sp.update_search_prompt();
        sp
    }

    pub fn update_search_prompt(&mut self) {
        let mut text = String::from("(");
        if self.failed {
            text.push_str("failed ");
        }
        if self.direction < 0 {
            text.push_str("reverse-");
        }
        text.push_str("i-search)`");
        text.extend(self.search_text.iter());
        text.push_str("': ");
        self.base.text = text.chars().collect();
        self.base.recalculate_geometry();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_prompt() {
        let pi = PromptInfo::new("> ", 80);
        assert_eq!(pi.visible_columns, 2);
        assert_eq!(pi.extra_lines, 0);
        assert_eq!(pi.indentation, 2);
        assert_eq!(pi.last_line_start, 0);
    }

    #[test]
    fn test_color_escapes_take_no_columns() {
        let pi = PromptInfo::new("\x1b[1;32m>>\x1b[0m ", 80);
        assert_eq!(pi.visible_columns, 3);
        assert_eq!(pi.indentation, 3);
        assert_eq!(pi.extra_lines, 0);
    }

    #[test]
    fn test_multi_line_prompt() {
        let pi = PromptInfo::new("first\nsecond\n$ ", 80);
        assert_eq!(pi.extra_lines, 2);
        assert_eq!(pi.indentation, 2);
        assert_eq!(pi.last_line_start, 13);
    }

    #[test]
    fn test_wrapping_prompt() {
        let pi = PromptInfo::new("aaaaaaaaaa", 4);
        assert_eq!(pi.extra_lines, 2);
        assert_eq!(pi.indentation, 2);
    }

    #[test]
    fn test_wide_prompt_chars() {
        let pi = PromptInfo::new("好> ", 80);
        assert_eq!(pi.visible_columns, 4);
        assert_eq!(pi.indentation, 4);
    }

    #[test]
    fn test_from_last_line() {
        let pi = PromptInfo::new("one\ntwo> ", 80);
        let last = PromptInfo::from_last_line(&pi);
        let text: String = last.text.iter().collect();
        assert_eq!(text, "two> ");
        assert_eq!(last.extra_lines, 0);
        assert_eq!(last.indentation, 5);
    }

    #[test]
    fn test_search_prompt_texts() {
        let mut sp = SearchPrompt::new(80, -1);
        let text: String = sp.base.text.iter().collect();
        assert_eq!(text, "(reverse-i-search)`': ");

        sp.search_text = "an".chars().collect();
        sp.direction = 1;
        sp.update_search_prompt();
        let text: String = sp.base.text.iter().collect();
        assert_eq!(text, "(i-search)`an': ");

        sp.failed = true;
        sp.update_search_prompt();
        let text: String = sp.base.text.iter().collect();
        assert_eq!(text, "(failed i-search)`an': ");
        assert_eq!(sp.base.indentation, text.chars().count());
    }
}
