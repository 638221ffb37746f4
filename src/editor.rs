//! The edit loop: one `Editor` owns the buffer, the kill-ring, the
//! history and the configured callbacks, and drives the whole
//! read-dispatch-redraw cycle of `input()`.

use std::io;
use std::mem;

use crate::highlight::{ansi_color, find_matching_brace, Color};
use crate::history::History;
use crate::keys::{self, is_control_char};
use crate::keys::{CTRL, META};
use crate::keys::{CTRL_A, CTRL_B, CTRL_C, CTRL_D, CTRL_DOWN, CTRL_E, CTRL_F, CTRL_G, CTRL_H,
                  CTRL_J, CTRL_K, CTRL_L, CTRL_LEFT, CTRL_M, CTRL_N, CTRL_P, CTRL_R,
                  CTRL_RIGHT, CTRL_S, CTRL_T, CTRL_U, CTRL_UP, CTRL_W, CTRL_Y, CTRL_Z, DEL,
                  DELETE_KEY, DOWN_ARROW_KEY, END_KEY, HOME_KEY, LEFT_ARROW_KEY, META_B,
                  META_BACKSPACE, META_C, META_D, META_F, META_GT, META_L, META_LEFT, META_LT,
                  META_N, META_P, META_RIGHT, META_U, META_Y, PAGE_DOWN_KEY, PAGE_UP_KEY,
                  RIGHT_ARROW_KEY, TAB, UP_ARROW_KEY};
use crate::killring::{Action, KillRing};
use crate::prompt::{PromptInfo, SearchPrompt};
use crate::screen::{calculate_screen_position, column_offset};
use crate::signals;
use crate::terminal::{self, RawModeGuard};
use crate::unicode::UnicodeBuffer;

/// All whitespace and all ASCII punctuation except underscore.
const DEFAULT_BREAK_CHARS: &str =
    " \t\x0b\x0c\x07\x08\r\n`~!@#$%^&*()-=+[{]}\\|;:'\",<.>/?";

const DEFAULT_MAX_HINT_ROWS: usize = 4;
const DEFAULT_COMPLETION_COUNT_CUTOFF: usize = 100;

/// Outcome of one `input()` call.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadResult {
    /// The user committed a line with Enter.
    Input(String),
    /// End of input: Ctrl-D on an empty line, or stdin closed.
    Eof,
    /// The user aborted the line with Ctrl-C.
    Interrupted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HintAction {
    /// Recompute hints and drop any selection.
    Regenerate,
    /// Redraw with the current selection kept.
    Repaint,
    /// Draw no hints at all.
    Skip,
}

pub type CompletionCallback = dyn FnMut(&str, &mut usize) -> Vec<String>;
pub type HintCallback = dyn FnMut(&str, &mut usize, &mut Color) -> Vec<String>;
pub type HighlightCallback = dyn FnMut(&str, &mut Vec<Color>);

pub struct Editor {
    data: UnicodeBuffer,
    display: Vec<char>,
    hint: Vec<char>,
    pos: usize,
    prefix: usize,
    hint_selection: i32,
    history: History,
    kill_ring: KillRing,
    max_hint_rows: usize,
    break_chars: String,
    completion_count_cutoff: usize,
    double_tab_completion: bool,
    complete_on_empty: bool,
    beep_on_ambiguous_completion: bool,
    no_color: bool,
    completion_callback: Option<Box<CompletionCallback>>,
    highlighter_callback: Option<Box<HighlightCallback>>,
    hint_callback: Option<Box<HintCallback>>,
    preloaded_buffer: String,
    error_message: String,
    previous_search_text: Vec<char>,
}

impl Default for Editor {
    fn default() -> Editor {
        Editor::new()
    }
}

impl Editor {
    pub fn new() -> Editor {
        Editor {
            data: UnicodeBuffer::new(),
            display: Vec::new(),
            hint: Vec::new(),
            pos: 0,
            prefix: 0,
            hint_selection: -1,
            history: History::new(),
            kill_ring: KillRing::new(),
            max_hint_rows: DEFAULT_MAX_HINT_ROWS,
            break_chars: DEFAULT_BREAK_CHARS.to_string(),
            completion_count_cutoff: DEFAULT_COMPLETION_COUNT_CUTOFF,
            double_tab_completion: false,
            complete_on_empty: true,
            beep_on_ambiguous_completion: false,
            no_color: false,
            completion_callback: None,
            highlighter_callback: None,
            hint_callback: None,
            preloaded_buffer: String::new(),
            error_message: String::new(),
            previous_search_text: Vec::new(),
        }
    }

    pub fn set_completion_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&str, &mut usize) -> Vec<String> + 'static,
    {
        self.completion_callback = Some(Box::new(callback));
    }

    pub fn set_highlighter_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&str, &mut Vec<Color>) + 'static,
    {
        self.highlighter_callback = Some(Box::new(callback));
    }

    pub fn set_hint_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&str, &mut usize, &mut Color) -> Vec<String> + 'static,
    {
        self.hint_callback = Some(Box::new(callback));
    }

    pub fn set_max_history_size(&mut self, size: usize) {
        self.history.set_max_size(size);
    }

    pub fn set_completion_count_cutoff(&mut self, count: usize) {
        self.completion_count_cutoff = count;
    }

    pub fn set_max_hint_rows(&mut self, rows: usize) {
        self.max_hint_rows = rows;
    }

    pub fn set_word_break_characters(&mut self, break_chars: &str) {
        self.break_chars = break_chars.to_string();
    }

    pub fn set_double_tab_completion(&mut self, value: bool) {
        self.double_tab_completion = value;
    }

    pub fn set_complete_on_empty(&mut self, value: bool) {
        self.complete_on_empty = value;
    }

    pub fn set_beep_on_ambiguous_completion(&mut self, value: bool) {
        self.beep_on_ambiguous_completion = value;
    }

    pub fn set_no_color(&mut self, value: bool) {
        self.no_color = value;
    }

    pub fn history_add(&mut self, line: &str) {
        self.history.add(line);
    }

    pub fn history_save(&self, path: &str) -> io::Result<()> {
        self.history.save(path)
    }

    pub fn history_load(&mut self, path: &str) -> io::Result<()> {
        self.history.load(path)
    }

    pub fn history_size(&self) -> usize {
        self.history.size()
    }

    pub fn history_line(&self, index: usize) -> Option<&str> {
        if index < self.history.size() {
            Some(self.history.line_at(index))
        } else {
            None
        }
    }

    pub fn install_window_change_handler(&self) -> io::Result<()> {
        signals::install_window_change_handler()
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        terminal::clear_whole_screen()
    }

    pub fn print(&self, text: &str) -> io::Result<()> {
        terminal::write_str(text)
    }

    /// Stage text for the next `input()` call. CR is dropped, runs of
    /// LF/TAB collapse to a single space, and any other control
    /// character becomes a space and arms a one-shot advisory message.
    pub fn preload_buffer(&mut self, text: &str) {
        let mut cleaned = String::with_capacity(text.len());
        let mut controls_stripped = false;
        let mut whitespace_seen = false;
        for ch in text.chars() {
            if ch == '\r' {
                continue;
            }
            if ch == '\n' || ch == '\t' {
                whitespace_seen = true;
                continue;
            }
            if whitespace_seen {
                cleaned.push(' ');
                whitespace_seen = false;
            }
            if is_control_char(ch) {
                cleaned.push(' ');
                controls_stripped = true;
            } else {
                cleaned.push(ch);
            }
        }
        self.preloaded_buffer = cleaned;
        self.error_message.clear();
        if controls_stripped {
            self.error_message =
                String::from(" [Edited line: control characters were converted to spaces]\n");
        }
    }

    /// Read one line. Interactive when stdin is a supported terminal;
    /// plain line-buffered stdin otherwise.
    pub fn input(&mut self, prompt: &str) -> io::Result<ReadResult> {
        signals::clear_resize();
        if !terminal::stdin_is_tty() {
            return self.read_from_stdin();
        }
        if !self.error_message.is_empty() {
            let msg = mem::take(&mut self.error_message);
            terminal::write_str(&msg)?;
        }
        let mut pi = PromptInfo::new(prompt, terminal::screen_columns());
        if terminal::is_unsupported_term() {
            pi.write()?;
            return self.read_from_stdin();
        }

        let guard = RawModeGuard::enter()?;
        self.reset_state();
        if !self.preloaded_buffer.is_empty() {
            let text = mem::take(&mut self.preloaded_buffer);
            self.data = UnicodeBuffer::from_str(&text);
            self.pos = self.data.len();
            self.prefix = self.pos;
        }
        let result = self.edit_line(&mut pi, &guard);
        drop(guard);

        let result = result?;
        // Ctrl-C already echoed "^C\r\n"; the other outcomes still owe
        // the terminal a fresh line
        match result {
            ReadResult::Input(_) | ReadResult::Eof => terminal::write_str("\n")?,
            ReadResult::Interrupted => {}
        }
        Ok(result)
    }

    fn read_from_stdin(&mut self) -> io::Result<ReadResult> {
        let mut line = mem::take(&mut self.preloaded_buffer);
        if line.is_empty() {
            let mut buf = String::new();
            if io::stdin().read_line(&mut buf)? == 0 {
                return Ok(ReadResult::Eof);
            }
            line = buf;
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(ReadResult::Input(line))
    }

    fn reset_state(&mut self) {
        self.pos = 0;
        self.prefix = 0;
        self.data.clear();
        self.hint_selection = -1;
        self.hint.clear();
        self.display.clear();
    }

    fn is_word_break_character(&self, ch: char) -> bool {
        (ch as u32) < 128 && self.break_chars.contains(ch)
    }

    /// Code points between `pos` and the previous word break.
    fn context_length(&self) -> usize {
        let mut prefix_len = self.pos;
        while prefix_len > 0 {
            if self.is_word_break_character(self.data[prefix_len - 1]) {
                break;
            }
            prefix_len -= 1;
        }
        self.pos - prefix_len
    }

    fn push_color(&mut self, color: Color) {
        for ch in ansi_color(color).chars() {
            self.display.push(ch);
        }
    }

    /// Rebuild `display` from the buffer: a color vector seeded by the
    /// highlighter callback, with the matching-brace mark applied last.
    fn build_display(&mut self, highlight_idx: Option<usize>, error: bool) {
        let mut colors = vec![Color::Default; self.data.len()];
        if !self.no_color && self.highlighter_callback.is_some() {
            let input = self.data.to_string();
            if let Some(callback) = self.highlighter_callback.as_mut() {
                callback(&input, &mut colors);
            }
            colors.resize(self.data.len(), Color::Default);
        }
        if let Some(idx) = highlight_idx {
            colors[idx] = if error { Color::Error } else { Color::BrightRed };
        }
        self.display.clear();
        let mut current = Color::Default;
        for i in 0..self.data.len() {
            if colors[i] != current {
                current = colors[i];
                self.push_color(current);
            }
            self.display.push(self.data[i]);
        }
        self.push_color(Color::Default);
    }

    /// Run the hint callback and append the hint text to `display`:
    /// inline for a single hint (or the selected one), plus up to
    /// `max_hint_rows` rows below the line. Returns the column delta the
    /// geometry pass must add for the inline part.
    fn handle_hints(&mut self, pi: &PromptInfo, hint_action: HintAction) -> isize {
        if self.no_color || self.hint_callback.is_none() || hint_action == HintAction::Skip {
            return 0;
        }
        if self.pos != self.data.len() {
            return 0;
        }
        self.hint.clear();
        if hint_action == HintAction::Regenerate {
            self.hint_selection = -1;
        }

        let mut color = Color::Gray;
        let mut context_len = self.context_length();
        let input = self.data.to_string();
        let hints: Vec<Vec<char>> = match self.hint_callback.as_mut() {
            Some(callback) => callback(&input, &mut context_len, &mut color)
                .iter()
                .map(|h| h.chars().collect())
                .collect(),
            None => return 0,
        };
        let hint_count = hints.len();
        let mut len: usize = 0;

        if hint_count == 1 {
            self.push_color(color);
            self.hint = hints[0].clone();
            len = self.hint.len();
            for i in context_len..len {
                self.display.push(self.hint[i]);
            }
            self.push_color(Color::Default);
        } else if self.max_hint_rows > 0 {
            let start_col =
                pi.indentation + self.data.column_width_upto(self.pos - context_len);
            let max_col = pi.screen_columns;
            if self.hint_selection < -1 {
                self.hint_selection = hint_count as i32 - 1;
            } else if self.hint_selection >= hint_count as i32 {
                self.hint_selection = -1;
            }
            self.push_color(color);
            if self.hint_selection != -1 {
                self.hint = hints[self.hint_selection as usize].clone();
                let available = max_col.saturating_sub(pi.indentation + self.data.column_width());
                len = self.hint.len().min(context_len + available);
                for i in context_len..len {
                    self.display.push(self.hint[i]);
                }
            }
            self.push_color(Color::Default);
            for hint_row in 0..hint_count.min(self.max_hint_rows) {
                self.display.push('\n');
                let mut col = 0;
                while col < start_col && col < max_col {
                    self.display.push(' ');
                    col += 1;
                }
                self.push_color(color);
                for i in (self.pos - context_len)..self.pos {
                    if col >= max_col {
                        break;
                    }
                    self.display.push(self.data[i]);
                    col += 1;
                }
                let mut hint_no = hint_row as i32 + self.hint_selection + 1;
                if hint_no == hint_count as i32 {
                    // the selected hint is already shown inline
                    continue;
                }
                if hint_no > hint_count as i32 {
                    hint_no -= 1;
                }
                let h = &hints[hint_no as usize % hint_count];
                for i in context_len..h.len() {
                    if col >= max_col {
                        break;
                    }
                    self.display.push(h[i]);
                    col += 1;
                }
                self.push_color(Color::Default);
            }
        }
        len as isize - context_len as isize
    }

    /// Redraw the input line: brace highlight, colourisation, hints,
    /// geometry, then cursor placement. The prompt itself is already on
    /// screen and is not repainted.
    fn refresh_line(&mut self, pi: &mut PromptInfo, hint_action: HintAction) -> io::Result<()> {
        let (highlight_idx, indicate_error) = match find_matching_brace(&self.data, self.pos) {
            Some((idx, error)) => (Some(idx), error),
            None => (None, false),
        };
        self.build_display(highlight_idx, indicate_error);
        let hint_len = self.handle_hints(pi, hint_action);

        let cols = pi.screen_columns;
        let end_offset = column_offset(self.data.widths(), self.data.len(), pi.indentation, cols);
        let end_offset = (end_offset as isize + hint_len).max(0) as usize;
        let (x_end, mut y_end) = calculate_screen_position(pi.indentation, 0, cols, end_offset);
        y_end += self.display.iter().filter(|&&ch| ch == '\n').count();

        let cursor_offset = column_offset(self.data.widths(), self.pos, pi.indentation, cols);
        let (x_cursor, y_cursor) = calculate_screen_position(pi.indentation, 0, cols, cursor_offset);

        // back to the start of the last prompt row, wipe the old frame
        let row_movement = pi.cursor_row_offset.saturating_sub(pi.extra_lines);
        if row_movement > 0 {
            terminal::move_cursor_up(row_movement)?;
        }
        terminal::cursor_to_column(pi.indentation + 1)?;
        terminal::clear_to_screen_end()?;

        if !self.no_color {
            terminal::write_chars(&self.display)?;
        } else {
            terminal::write_chars(self.data.chars())?;
        }

        // an explicit newline defeats the terminal's deferred-wrap
        // ambiguity when the text ends exactly on the right edge
        if x_end == 0 && y_end > 0 {
            terminal::write_str("\n")?;
        }

        let up = y_end.saturating_sub(y_cursor);
        if up > 0 {
            terminal::move_cursor_up(up)?;
        }
        terminal::cursor_to_column(x_cursor + 1)?;

        pi.cursor_row_offset = pi.extra_lines + y_cursor;
        pi.previous_input_len = self.data.len();
        Ok(())
    }

    /// Insert a printable code point, or beep. Simple appends to a
    /// non-wrapping plain line skip the full refresh and write the one
    /// glyph straight through.
    fn insert_character(&mut self, pi: &mut PromptInfo, c: u32) -> io::Result<()> {
        self.kill_ring.last_action = Action::Other;
        self.history.reset_recall_most_recent();
        if c & (META | CTRL) != 0 {
            terminal::beep();
            return Ok(());
        }
        let ch = match char::from_u32(c) {
            Some(ch) if !is_control_char(ch) => ch,
            _ => {
                terminal::beep();
                return Ok(());
            }
        };
        self.data.insert(self.pos, ch);
        self.pos += 1;
        let input_len = self.data.column_width();
        let at_end = self.pos == self.data.len();
        if at_end
            && (self.no_color
                || (self.highlighter_callback.is_none()
                    && self.hint_callback.is_none()
                    && pi.indentation + input_len < pi.screen_columns))
        {
            if input_len > pi.previous_input_len {
                pi.previous_input_len = input_len;
            }
            let mut tmp = [0u8; 4];
            terminal::write_str(ch.encode_utf8(&mut tmp))
        } else {
            self.refresh_line(pi, HintAction::Regenerate)
        }
    }

    fn clear_screen_and_redraw(&mut self, pi: &mut PromptInfo) -> io::Result<()> {
        terminal::clear_whole_screen()?;
        pi.write()?;
        if pi.indentation == 0 && pi.extra_lines > 0 {
            terminal::write_str("\n")?;
        }
        pi.cursor_row_offset = pi.extra_lines;
        self.refresh_line(pi, HintAction::Regenerate)
    }

    /// Tab handling: ask the completion callback, extend by the longest
    /// common prefix, or list the candidates (paginated) when the prefix
    /// is exhausted. A non-Tab key read while waiting is handed back to
    /// the dispatcher.
    fn complete_line(&mut self, pi: &mut PromptInfo) -> io::Result<u32> {
        let input = self.data.utf8_upto(self.pos);
        let mut context_len = self.context_length();
        let completions: Vec<Vec<char>> = match self.completion_callback.as_mut() {
            Some(callback) => callback(&input, &mut context_len)
                .iter()
                .map(|c| c.chars().collect())
                .collect(),
            None => Vec::new(),
        };
        if completions.is_empty() {
            terminal::beep();
            return Ok(0);
        }

        let mut completions_count = completions.len();
        let mut selected_completion = 0usize;
        if self.hint_selection >= 0 && (self.hint_selection as usize) < completions.len() {
            selected_completion = self.hint_selection as usize;
            completions_count = 1;
        }
        let longest_common_prefix = if completions_count == 1 {
            completions[selected_completion].len()
        } else {
            common_prefix_length(&completions)
        };
        if self.beep_on_ambiguous_completion && completions_count != 1 {
            terminal::beep();
        }

        // extend in place when the typed context can grow
        if longest_common_prefix > context_len || completions_count == 1 {
            if longest_common_prefix > context_len {
                let tail: Vec<char> =
                    completions[selected_completion][context_len..longest_common_prefix].to_vec();
                self.data.insert_chars(self.pos, &tail);
                self.pos += longest_common_prefix - context_len;
                self.prefix = self.pos;
            }
            self.refresh_line(pi, HintAction::Regenerate)?;
            return Ok(0);
        }

        let mut c: u32 = 0;
        if self.double_tab_completion {
            c = keys::cleanup_ctrl(keys::read_char()?);
            if c != TAB {
                return Ok(c);
            }
        }

        let mut show_completions = true;
        let mut on_new_line = false;
        if completions.len() > self.completion_count_cutoff {
            let save_pos = self.pos;
            self.pos = self.data.len();
            self.refresh_line(pi, HintAction::Regenerate)?;
            self.pos = save_pos;
            terminal::write_str(&format!(
                "\nDisplay all {} possibilities? (y or n)",
                completions.len()
            ))?;
            on_new_line = true;
            loop {
                c = keys::cleanup_ctrl(keys::read_char()?);
                if c == 0 {
                    c = 'n' as u32;
                }
                if c == 'y' as u32 || c == 'Y' as u32 || c == 'n' as u32 || c == 'N' as u32
                    || c == CTRL_C
                {
                    break;
                }
            }
            if c == 'n' as u32 || c == 'N' as u32 {
                show_completions = false;
            } else if c == CTRL_C {
                show_completions = false;
                terminal::write_str("^C")?;
                c = 0;
            }
        }

        let mut stop_list = false;
        if show_completions {
            let longest = completions.iter().map(|c| c.len()).max().unwrap_or(0) + 2;
            let column_count = (pi.screen_columns / longest).max(1);
            if !on_new_line {
                let save_pos = self.pos;
                self.pos = self.data.len();
                self.refresh_line(pi, HintAction::Skip)?;
                self.pos = save_pos;
            } else {
                terminal::clear_to_screen_end()?;
            }
            let mut pause_row = terminal::screen_rows() - 1;
            let row_count = (completions.len() + column_count - 1) / column_count;
            for row in 0..row_count {
                if row == pause_row {
                    terminal::write_str("\n--More--")?;
                    c = 0;
                    let mut do_beep = false;
                    loop {
                        if c == ' ' as u32 || c == '\r' as u32 || c == '\n' as u32
                            || c == 'y' as u32 || c == 'Y' as u32 || c == 'n' as u32
                            || c == 'N' as u32 || c == 'q' as u32 || c == 'Q' as u32
                            || c == CTRL_C
                        {
                            break;
                        }
                        if do_beep {
                            terminal::beep();
                        }
                        do_beep = true;
                        c = keys::cleanup_ctrl(keys::read_char()?);
                        if c == 0 {
                            c = 'q' as u32;
                        }
                    }
                    if c == ' ' as u32 || c == 'y' as u32 || c == 'Y' as u32 {
                        terminal::write_str("\r\x1b[K")?;
                        pause_row += terminal::screen_rows() - 1;
                    } else if c == '\r' as u32 || c == '\n' as u32 {
                        terminal::write_str("\r\x1b[K")?;
                        pause_row += 1;
                    } else if c == CTRL_C {
                        terminal::write_str("^C")?;
                        stop_list = true;
                    } else {
                        terminal::write_str("\r\x1b[K")?;
                        stop_list = true;
                    }
                } else {
                    terminal::write_str("\n")?;
                }
                if stop_list {
                    break;
                }
                for column in 0..column_count {
                    let index = column * row_count + row;
                    if index >= completions.len() {
                        continue;
                    }
                    let item = &completions[index];
                    if !self.no_color {
                        terminal::write_str(ansi_color(Color::BrightMagenta))?;
                    }
                    let context_start = self.pos - context_len;
                    terminal::write_chars(
                        &self.data.chars()[context_start..context_start + longest_common_prefix],
                    )?;
                    if !self.no_color {
                        terminal::write_str(ansi_color(Color::Default))?;
                    }
                    terminal::write_chars(&item[longest_common_prefix..])?;
                    if (column + 1) * row_count + row < completions.len() {
                        for _ in item.len()..longest {
                            terminal::write_str(" ")?;
                        }
                    }
                }
            }
        }

        // back to business: prompt on a fresh line, input redrawn
        if !stop_list || c == CTRL_C {
            terminal::write_str("\n")?;
        }
        pi.write()?;
        if pi.indentation == 0 && pi.extra_lines > 0 {
            terminal::write_str("\n")?;
        }
        pi.cursor_row_offset = pi.extra_lines;
        self.refresh_line(pi, HintAction::Regenerate)?;
        Ok(0)
    }

    /// Meta-P / Meta-N: recall the nearest history entry sharing the
    /// first `prefix` code points with the current line.
    fn common_prefix_search(&mut self, pi: &mut PromptInfo, start_char: u32) -> io::Result<()> {
        self.kill_ring.last_action = Action::Other;
        let line = self.data.to_string();
        let back = start_char == META_P;
        if self.history.common_prefix_search(&line, self.prefix, back) {
            self.data.assign_str(&self.history.current().to_string());
            self.pos = self.data.len();
            self.refresh_line(pi, HintAction::Regenerate)?;
        }
        Ok(())
    }

    /// Ctrl-R / Ctrl-S: take over prompt and keyboard while the user
    /// types a search string. Returns the key that ended the search so
    /// the dispatcher can run it, or `None` when the search was
    /// cancelled.
    fn incremental_history_search(
        &mut self,
        pi: &mut PromptInfo,
        start_char: u32,
        guard: &RawModeGuard,
    ) -> io::Result<Option<u32>> {
        log!("incremental search started");
        if self.history.is_last() {
            let line = self.data.to_string();
            self.history.update_last(&line);
        }
        let mut history_line_position = self.pos;

        // erase the old input line before the dynamic prompt takes over
        let saved_data = mem::take(&mut self.data);
        let saved_pos = self.pos;
        self.pos = 0;
        self.refresh_line(pi, HintAction::Skip)?;
        self.data = saved_data;
        self.pos = saved_pos;

        let mut dp = SearchPrompt::new(
            pi.screen_columns,
            if start_char == CTRL_R { -1 } else { 1 },
        );
        dp.base.previous_len = pi.previous_len;
        dp.base.previous_input_len = pi.previous_input_len;
        dynamic_refresh(&mut dp.base, &self.data, history_line_position)?;

        let mut c: u32 = 0;
        let mut keep_looping = true;
        let mut aborted = false;
        let mut use_searched_line = true;
        let mut search_again = false;
        let mut active_history_line = UnicodeBuffer::new();
        while keep_looping {
            c = keys::normalize_meta(keys::cleanup_ctrl(keys::read_char()?));
            if c == 0 {
                if signals::take_resize() {
                    dp.base.screen_columns = terminal::screen_columns();
                    dp.update_search_prompt();
                    dynamic_refresh(&mut dp.base, &active_history_line, history_line_position)?;
                    continue;
                }
                // input stream ended: give up on the search
                aborted = true;
                use_searched_line = false;
                break;
            }
            match c {
                // keys that leave search and keep the selected text
                CTRL_A | HOME_KEY | CTRL_B | LEFT_ARROW_KEY | META_B | CTRL_LEFT | META_LEFT
                | CTRL_D | META_D | CTRL_E | END_KEY | CTRL_F | RIGHT_ARROW_KEY | META_F
                | CTRL_RIGHT | META_RIGHT | META_BACKSPACE | CTRL_J | CTRL_K | CTRL_M | CTRL_N
                | CTRL_P | DOWN_ARROW_KEY | UP_ARROW_KEY | CTRL_T | CTRL_U | CTRL_W | META_Y
                | DEL | DELETE_KEY | META_LT | PAGE_UP_KEY | META_GT | PAGE_DOWN_KEY => {
                    keep_looping = false;
                }
                // keys that discard the search
                CTRL_C | CTRL_G | CTRL_L => {
                    keep_looping = false;
                    use_searched_line = false;
                    if c != CTRL_L {
                        aborted = true;
                    }
                }
                CTRL_S | CTRL_R => {
                    if dp.search_text.is_empty() && !self.previous_search_text.is_empty() {
                        dp.search_text = self.previous_search_text.clone();
                        dp.update_search_prompt();
                    }
                    if (dp.direction == 1 && c == CTRL_R)
                        || (dp.direction == -1 && c == CTRL_S)
                    {
                        dp.direction = -dp.direction;
                        dp.update_search_prompt();
                    } else {
                        search_again = true;
                    }
                }
                CTRL_Z => {
                    guard.suspend()?;
                    signals::stop_self();
                    guard.resume()?;
                    dynamic_refresh(&mut dp.base, &active_history_line, history_line_position)?;
                    continue;
                }
                CTRL_H => {
                    if !dp.search_text.is_empty() {
                        dp.search_text.pop();
                        dp.failed = false;
                        dp.update_search_prompt();
                        let boundary = if dp.direction == -1 {
                            self.history.size().saturating_sub(1)
                        } else {
                            0
                        };
                        self.history.reset_pos(Some(boundary));
                    } else {
                        terminal::beep();
                    }
                }
                CTRL_Y => {}
                _ => match char::from_u32(c) {
                    Some(ch) if c & (META | CTRL) == 0 && !is_control_char(ch) => {
                        dp.search_text.push(ch);
                        dp.update_search_prompt();
                        let boundary = if dp.direction == -1 {
                            self.history.size().saturating_sub(1)
                        } else {
                            0
                        };
                        self.history.reset_pos(Some(boundary));
                    }
                    _ => terminal::beep(),
                },
            }
            if !keep_looping {
                break;
            }

            active_history_line.assign_str(&self.history.current().to_string());
            if !dp.search_text.is_empty() {
                let mut found = false;
                let mut history_search_index = self.history.current_pos() as isize;
                let mut line_search_pos = history_line_position as isize;
                if search_again {
                    line_search_pos += dp.direction as isize;
                }
                search_again = false;
                let needle_len = dp.search_text.len();
                loop {
                    while line_search_pos >= 0
                        && line_search_pos as usize + needle_len <= active_history_line.len()
                    {
                        let start = line_search_pos as usize;
                        if active_history_line.chars()[start..start + needle_len]
                            == dp.search_text[..]
                        {
                            found = true;
                            break;
                        }
                        line_search_pos += dp.direction as isize;
                    }
                    if found {
                        self.history.reset_pos(Some(history_search_index as usize));
                        history_line_position = line_search_pos as usize;
                        if dp.failed {
                            dp.failed = false;
                            dp.update_search_prompt();
                        }
                        break;
                    }
                    let can_step = if dp.direction > 0 {
                        history_search_index < self.history.size() as isize - 1
                    } else {
                        history_search_index > 0
                    };
                    if can_step {
                        history_search_index += dp.direction as isize;
                        active_history_line
                            .assign_str(&self.history.line_at(history_search_index as usize).to_string());
                        line_search_pos = if dp.direction > 0 {
                            0
                        } else {
                            active_history_line.len() as isize - needle_len as isize
                        };
                    } else {
                        terminal::beep();
                        if !dp.failed {
                            dp.failed = true;
                            dp.update_search_prompt();
                        }
                        break;
                    }
                }
            }
            active_history_line.assign_str(&self.history.current().to_string());
            dynamic_refresh(&mut dp.base, &active_history_line, history_line_position)?;
        }

        // hand the display back to the static prompt's last line
        let mut pb = PromptInfo::from_last_line(pi);
        pb.previous_input_len = active_history_line.len();
        pb.cursor_row_offset = dp.base.cursor_row_offset;
        pb.previous_len = dp.base.visible_columns;
        if use_searched_line && !active_history_line.is_empty() {
            self.history.set_recall_most_recent();
            self.data.assign_chars(active_history_line.chars());
            self.pos = history_line_position;
            self.prefix = self.pos;
        }
        dynamic_refresh(&mut pb, &self.data, self.pos)?;
        pi.previous_input_len = self.data.len();
        pi.cursor_row_offset = pi.extra_lines + pb.cursor_row_offset;
        self.previous_search_text = dp.search_text.clone();
        log!("incremental search done, aborted: {}", aborted);
        Ok(if aborted { None } else { Some(c) })
    }

    /// The dispatcher. One logical key per iteration; every branch ends
    /// in a redraw, an exit, or a beep.
    fn edit_line(&mut self, pi: &mut PromptInfo, guard: &RawModeGuard) -> io::Result<ReadResult> {
        // the latest history entry always mirrors the working buffer
        let line = self.data.to_string();
        self.history.push_tail(&line);
        self.history.reset_pos(None);

        pi.write()?;
        if pi.indentation == 0 && pi.extra_lines > 0 {
            terminal::write_str("\n")?;
        }
        pi.cursor_row_offset = pi.extra_lines;
        self.kill_ring.last_action = Action::Other;

        let mut terminating_keystroke: Option<u32> = None;
        if !self.data.is_empty() {
            self.refresh_line(pi, HintAction::Regenerate)?;
        }

        loop {
            if signals::take_resize() {
                pi.screen_columns = terminal::screen_columns();
                log!("window resized to {} columns", pi.screen_columns);
                dynamic_refresh(pi, &self.data, self.pos)?;
            }
            let mut c = match terminating_keystroke.take() {
                Some(k) => k,
                None => keys::read_char()?,
            };
            c = keys::normalize_meta(keys::cleanup_ctrl(c));

            if c == 0 {
                // a read interrupted by SIGWINCH comes back as token 0;
                // the flag check at the top of the loop redraws then
                if signals::resize_pending() {
                    continue;
                }
                // input stream ended mid-line: commit what we have
                self.history.commit_index();
                self.history.drop_last();
                return Ok(ReadResult::Input(self.data.to_string()));
            }

            let mut update_prefix = true;
            match c {
                CTRL_A | HOME_KEY => {
                    self.kill_ring.last_action = Action::Other;
                    self.pos = 0;
                    self.refresh_line(pi, HintAction::Regenerate)?;
                }

                CTRL_B | LEFT_ARROW_KEY => {
                    self.kill_ring.last_action = Action::Other;
                    if self.pos > 0 {
                        self.pos -= 1;
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                }

                META_B | CTRL_LEFT | META_LEFT => {
                    self.kill_ring.last_action = Action::Other;
                    if self.pos > 0 {
                        while self.pos > 0 && self.is_word_break_character(self.data[self.pos - 1])
                        {
                            self.pos -= 1;
                        }
                        while self.pos > 0
                            && !self.is_word_break_character(self.data[self.pos - 1])
                        {
                            self.pos -= 1;
                        }
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                }

                CTRL_C => {
                    self.kill_ring.last_action = Action::Other;
                    self.history.reset_recall_most_recent();
                    self.history.drop_last();
                    // one last refresh with the cursor at end of line, so
                    // the next prompt does not land on top of the input
                    self.pos = self.data.len();
                    self.refresh_line(pi, HintAction::Skip)?;
                    terminal::write_str("^C\r\n")?;
                    return Ok(ReadResult::Interrupted);
                }

                META_C => {
                    self.kill_ring.last_action = Action::Other;
                    self.history.reset_recall_most_recent();
                    if self.pos < self.data.len() {
                        while self.pos < self.data.len()
                            && self.is_word_break_character(self.data[self.pos])
                        {
                            self.pos += 1;
                        }
                        if self.pos < self.data.len()
                            && !self.is_word_break_character(self.data[self.pos])
                        {
                            let ch = self.data[self.pos];
                            if ch.is_ascii_lowercase() {
                                self.data.set(self.pos, ch.to_ascii_uppercase());
                            }
                            self.pos += 1;
                        }
                        while self.pos < self.data.len()
                            && !self.is_word_break_character(self.data[self.pos])
                        {
                            let ch = self.data[self.pos];
                            if ch.is_ascii_uppercase() {
                                self.data.set(self.pos, ch.to_ascii_lowercase());
                            }
                            self.pos += 1;
                        }
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                }

                CTRL_D => {
                    self.kill_ring.last_action = Action::Other;
                    if !self.data.is_empty() && self.pos < self.data.len() {
                        self.history.reset_recall_most_recent();
                        self.data.erase(self.pos);
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    } else if self.data.is_empty() {
                        self.history.drop_last();
                        return Ok(ReadResult::Eof);
                    }
                }

                META_D => {
                    if self.pos < self.data.len() {
                        self.history.reset_recall_most_recent();
                        let mut ending_pos = self.pos;
                        while ending_pos < self.data.len()
                            && self.is_word_break_character(self.data[ending_pos])
                        {
                            ending_pos += 1;
                        }
                        while ending_pos < self.data.len()
                            && !self.is_word_break_character(self.data[ending_pos])
                        {
                            ending_pos += 1;
                        }
                        let span: String =
                            self.data.chars()[self.pos..ending_pos].iter().collect();
                        self.kill_ring.kill(&span, true);
                        self.data.erase_range(self.pos, ending_pos - self.pos);
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                    self.kill_ring.last_action = Action::Kill;
                }

                CTRL_E | END_KEY => {
                    self.kill_ring.last_action = Action::Other;
                    self.pos = self.data.len();
                    self.refresh_line(pi, HintAction::Regenerate)?;
                }

                CTRL_F | RIGHT_ARROW_KEY => {
                    self.kill_ring.last_action = Action::Other;
                    if self.pos < self.data.len() {
                        self.pos += 1;
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                }

                META_F | CTRL_RIGHT | META_RIGHT => {
                    self.kill_ring.last_action = Action::Other;
                    if self.pos < self.data.len() {
                        while self.pos < self.data.len()
                            && self.is_word_break_character(self.data[self.pos])
                        {
                            self.pos += 1;
                        }
                        while self.pos < self.data.len()
                            && !self.is_word_break_character(self.data[self.pos])
                        {
                            self.pos += 1;
                        }
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                }

                CTRL_H => {
                    self.kill_ring.last_action = Action::Other;
                    if self.pos > 0 {
                        self.history.reset_recall_most_recent();
                        self.pos -= 1;
                        self.data.erase(self.pos);
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                }

                META_BACKSPACE => {
                    if self.pos > 0 {
                        self.history.reset_recall_most_recent();
                        let starting_pos = self.pos;
                        while self.pos > 0 && self.is_word_break_character(self.data[self.pos - 1])
                        {
                            self.pos -= 1;
                        }
                        while self.pos > 0
                            && !self.is_word_break_character(self.data[self.pos - 1])
                        {
                            self.pos -= 1;
                        }
                        let span: String =
                            self.data.chars()[self.pos..starting_pos].iter().collect();
                        self.kill_ring.kill(&span, false);
                        self.data.erase_range(self.pos, starting_pos - self.pos);
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                    self.kill_ring.last_action = Action::Kill;
                }

                TAB => {
                    if self.completion_callback.is_some()
                        && (self.complete_on_empty || self.pos > 0)
                    {
                        self.kill_ring.last_action = Action::Other;
                        self.history.reset_recall_most_recent();
                        let next_key = self.complete_line(pi)?;
                        if next_key != 0 {
                            terminating_keystroke = Some(next_key);
                        }
                    } else {
                        self.insert_character(pi, c)?;
                    }
                }

                CTRL_J | CTRL_M => {
                    self.kill_ring.last_action = Action::Other;
                    // one last refresh with the cursor at end of line, so
                    // the next prompt does not land on top of the input
                    self.pos = self.data.len();
                    self.refresh_line(pi, HintAction::Skip)?;
                    self.history.commit_index();
                    self.history.drop_last();
                    return Ok(ReadResult::Input(self.data.to_string()));
                }

                CTRL_K => {
                    let span: String = self.data.chars()[self.pos..].iter().collect();
                    self.kill_ring.kill(&span, true);
                    self.data.erase_range(self.pos, self.data.len() - self.pos);
                    self.refresh_line(pi, HintAction::Regenerate)?;
                    self.kill_ring.last_action = Action::Kill;
                    self.history.reset_recall_most_recent();
                }

                CTRL_L => {
                    self.clear_screen_and_redraw(pi)?;
                }

                META_L => {
                    self.kill_ring.last_action = Action::Other;
                    if self.pos < self.data.len() {
                        self.history.reset_recall_most_recent();
                        while self.pos < self.data.len()
                            && self.is_word_break_character(self.data[self.pos])
                        {
                            self.pos += 1;
                        }
                        while self.pos < self.data.len()
                            && !self.is_word_break_character(self.data[self.pos])
                        {
                            let ch = self.data[self.pos];
                            if ch.is_ascii_uppercase() {
                                self.data.set(self.pos, ch.to_ascii_lowercase());
                            }
                            self.pos += 1;
                        }
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                }

                CTRL_N | CTRL_P | DOWN_ARROW_KEY | UP_ARROW_KEY => {
                    self.kill_ring.last_action = Action::Other;
                    // swap the current line into the history tail first,
                    // so navigation needs no special case for it
                    if self.history.is_last() {
                        let line = self.data.to_string();
                        self.history.update_last(&line);
                    }
                    if !self.history.is_empty() {
                        let up = c == CTRL_P || c == UP_ARROW_KEY;
                        if self.history.move_index(up) {
                            self.data.assign_str(&self.history.current().to_string());
                            self.pos = self.data.len();
                            self.refresh_line(pi, HintAction::Regenerate)?;
                        }
                    }
                }

                CTRL_UP => {
                    if !self.no_color {
                        self.kill_ring.last_action = Action::Other;
                        self.hint_selection -= 1;
                        self.refresh_line(pi, HintAction::Repaint)?;
                    }
                }

                CTRL_DOWN => {
                    if !self.no_color {
                        self.kill_ring.last_action = Action::Other;
                        self.hint_selection += 1;
                        self.refresh_line(pi, HintAction::Repaint)?;
                    }
                }

                META_P | META_N => {
                    self.common_prefix_search(pi, c)?;
                    update_prefix = false;
                }

                CTRL_R | CTRL_S => {
                    match self.incremental_history_search(pi, c, guard)? {
                        Some(key) => terminating_keystroke = Some(key),
                        None => self.refresh_line(pi, HintAction::Regenerate)?,
                    }
                }

                CTRL_T => {
                    self.kill_ring.last_action = Action::Other;
                    if self.pos > 0 && self.data.len() > 1 {
                        self.history.reset_recall_most_recent();
                        let left = if self.pos == self.data.len() {
                            self.pos - 2
                        } else {
                            self.pos - 1
                        };
                        let a = self.data[left];
                        let b = self.data[left + 1];
                        self.data.set(left, b);
                        self.data.set(left + 1, a);
                        if self.pos != self.data.len() {
                            self.pos += 1;
                        }
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                }

                CTRL_U => {
                    if self.pos > 0 {
                        self.history.reset_recall_most_recent();
                        let span: String = self.data.chars()[..self.pos].iter().collect();
                        self.kill_ring.kill(&span, false);
                        self.data.erase_range(0, self.pos);
                        self.pos = 0;
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                    self.kill_ring.last_action = Action::Kill;
                }

                META_U => {
                    self.kill_ring.last_action = Action::Other;
                    if self.pos < self.data.len() {
                        self.history.reset_recall_most_recent();
                        while self.pos < self.data.len()
                            && self.is_word_break_character(self.data[self.pos])
                        {
                            self.pos += 1;
                        }
                        while self.pos < self.data.len()
                            && !self.is_word_break_character(self.data[self.pos])
                        {
                            let ch = self.data[self.pos];
                            if ch.is_ascii_lowercase() {
                                self.data.set(self.pos, ch.to_ascii_uppercase());
                            }
                            self.pos += 1;
                        }
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                }

                CTRL_W => {
                    // kill to whitespace, not to a word break
                    if self.pos > 0 {
                        self.history.reset_recall_most_recent();
                        let starting_pos = self.pos;
                        while self.pos > 0 && self.data[self.pos - 1] == ' ' {
                            self.pos -= 1;
                        }
                        while self.pos > 0 && self.data[self.pos - 1] != ' ' {
                            self.pos -= 1;
                        }
                        let span: String =
                            self.data.chars()[self.pos..starting_pos].iter().collect();
                        self.kill_ring.kill(&span, false);
                        self.data.erase_range(self.pos, starting_pos - self.pos);
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                    self.kill_ring.last_action = Action::Kill;
                }

                CTRL_Y => {
                    self.history.reset_recall_most_recent();
                    match self.kill_ring.yank() {
                        Some(text) => {
                            let chars: Vec<char> = text.chars().collect();
                            self.data.insert_chars(self.pos, &chars);
                            self.pos += chars.len();
                            self.refresh_line(pi, HintAction::Regenerate)?;
                            self.kill_ring.last_action = Action::Yank;
                            self.kill_ring.last_yank_size = chars.len();
                        }
                        None => terminal::beep(),
                    }
                }

                META_Y => {
                    let mut popped = None;
                    if self.kill_ring.last_action == Action::Yank {
                        self.history.reset_recall_most_recent();
                        popped = self.kill_ring.yank_pop();
                    }
                    match popped {
                        Some(text) => {
                            let chars: Vec<char> = text.chars().collect();
                            self.pos -= self.kill_ring.last_yank_size;
                            self.data.erase_range(self.pos, self.kill_ring.last_yank_size);
                            self.data.insert_chars(self.pos, &chars);
                            self.pos += chars.len();
                            self.kill_ring.last_yank_size = chars.len();
                            self.refresh_line(pi, HintAction::Regenerate)?;
                        }
                        None => terminal::beep(),
                    }
                }

                CTRL_Z => {
                    log!("suspending on ctrl-z");
                    guard.suspend()?;
                    signals::stop_self();
                    guard.resume()?;
                    pi.write()?;
                    self.refresh_line(pi, HintAction::Regenerate)?;
                }

                DEL | DELETE_KEY => {
                    self.kill_ring.last_action = Action::Other;
                    if !self.data.is_empty() && self.pos < self.data.len() {
                        self.history.reset_recall_most_recent();
                        self.data.erase(self.pos);
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                }

                META_LT | PAGE_UP_KEY | META_GT | PAGE_DOWN_KEY => {
                    self.kill_ring.last_action = Action::Other;
                    if self.history.is_last() {
                        let line = self.data.to_string();
                        self.history.update_last(&line);
                    }
                    if !self.history.is_empty() {
                        self.history.jump(c == META_LT || c == PAGE_UP_KEY);
                        self.data.assign_str(&self.history.current().to_string());
                        self.pos = self.data.len();
                        self.refresh_line(pi, HintAction::Regenerate)?;
                    }
                }

                _ => {
                    self.insert_character(pi, c)?;
                }
            }

            if update_prefix {
                self.prefix = self.pos;
            }
        }
    }
}

/// Longest common prefix of the candidate set, in code points.
fn common_prefix_length(completions: &[Vec<char>]) -> usize {
    if completions.is_empty() {
        return 0;
    }
    let sample = &completions[0];
    let mut lcp = 0;
    loop {
        if lcp >= sample.len() {
            return lcp;
        }
        let sc = sample[lcp];
        for candidate in &completions[1..] {
            if lcp >= candidate.len() || candidate[lcp] != sc {
                return lcp;
            }
        }
        lcp += 1;
    }
}

/// Repaint prompt and input from scratch: used by the dynamic search
/// prompt, and to redraw the static prompt after a resize or when search
/// hands the display back.
fn dynamic_refresh(pi: &mut PromptInfo, buf: &UnicodeBuffer, pos: usize) -> io::Result<()> {
    let pos = pos.min(buf.len());
    let cols = pi.screen_columns;

    let (x_prompt, y_prompt) = calculate_screen_position(0, 0, cols, pi.visible_columns);
    pi.indentation = x_prompt;

    let end = column_offset(buf.widths(), buf.len(), x_prompt, cols);
    let (x_end, y_end) = calculate_screen_position(x_prompt, y_prompt, cols, end);
    let cur = column_offset(buf.widths(), pos, x_prompt, cols);
    let (x_cursor, y_cursor) = calculate_screen_position(x_prompt, y_prompt, cols, cur);

    let row_movement = pi.cursor_row_offset.saturating_sub(pi.extra_lines);
    if row_movement > 0 {
        terminal::move_cursor_up(row_movement)?;
    }
    terminal::cursor_to_column(1)?;
    terminal::clear_to_screen_end()?;

    pi.write()?;
    terminal::write_chars(buf.chars())?;
    if x_end == 0 && y_end > 0 {
        terminal::write_str("\n")?;
    }

    let up = y_end.saturating_sub(y_cursor);
    if up > 0 {
        terminal::move_cursor_up(up)?;
    }
    terminal::cursor_to_column(x_cursor + 1)?;

    pi.cursor_row_offset = pi.extra_lines + y_cursor;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration() {
        let ed = Editor::new();
        assert_eq!(ed.max_hint_rows, 4);
        assert_eq!(ed.completion_count_cutoff, 100);
        assert!(ed.complete_on_empty);
        assert!(!ed.double_tab_completion);
        assert!(!ed.no_color);
        assert_eq!(ed.hint_selection, -1);
    }

    #[test]
    fn test_word_break_predicate() {
        let ed = Editor::new();
        assert!(ed.is_word_break_character(' '));
        assert!(ed.is_word_break_character('('));
        assert!(ed.is_word_break_character(','));
        assert!(!ed.is_word_break_character('_'));
        assert!(!ed.is_word_break_character('a'));
        // non-ASCII never breaks a word
        assert!(!ed.is_word_break_character('é'));
        assert!(!ed.is_word_break_character('、'));
    }

    #[test]
    fn test_custom_break_chars() {
        let mut ed = Editor::new();
        ed.set_word_break_characters(" /");
        assert!(ed.is_word_break_character('/'));
        assert!(!ed.is_word_break_character('('));
    }

    #[test]
    fn test_context_length() {
        let mut ed = Editor::new();
        ed.data.assign_str("git com");
        ed.pos = 7;
        assert_eq!(ed.context_length(), 3);
        ed.pos = 4;
        assert_eq!(ed.context_length(), 0);
        ed.data.assign_str("word");
        ed.pos = 4;
        assert_eq!(ed.context_length(), 4);
    }

    #[test]
    fn test_common_prefix_length() {
        let to_chars = |items: &[&str]| -> Vec<Vec<char>> {
            items.iter().map(|s| s.chars().collect()).collect()
        };
        assert_eq!(common_prefix_length(&to_chars(&["commit", "commute", "common"])), 4);
        assert_eq!(common_prefix_length(&to_chars(&["alpha", "beta"])), 0);
        assert_eq!(common_prefix_length(&to_chars(&["same", "same"])), 4);
        assert_eq!(common_prefix_length(&to_chars(&["sam", "same"])), 3);
        assert_eq!(common_prefix_length(&to_chars(&[])), 0);
        assert_eq!(common_prefix_length(&to_chars(&["héllo", "héllp"])), 4);
    }

    #[test]
    fn test_preload_buffer_cleanup() {
        let mut ed = Editor::new();
        ed.preload_buffer("one\r\ntwo\tthree");
        assert_eq!(ed.preloaded_buffer, "one two three");
        assert!(ed.error_message.is_empty());

        ed.preload_buffer("a\x01b");
        assert_eq!(ed.preloaded_buffer, "a b");
        assert!(!ed.error_message.is_empty());

        // trailing whitespace run is dropped
        ed.preload_buffer("tail\n\t\n");
        assert_eq!(ed.preloaded_buffer, "tail");
    }

    #[test]
    fn test_kill_yank_pop_sequence() {
        // Ctrl-K on "abcdef" at pos 3, then Ctrl-Y, then Meta-Y with an
        // older kill "xyz" in the ring
        let mut ed = Editor::new();
        ed.kill_ring.kill("xyz", true);
        ed.kill_ring.last_action = Action::Other;

        ed.data.assign_str("abcdef");
        ed.pos = 3;
        let span: String = ed.data.chars()[ed.pos..].iter().collect();
        ed.kill_ring.kill(&span, true);
        ed.data.erase_range(ed.pos, ed.data.len() - ed.pos);
        ed.kill_ring.last_action = Action::Kill;
        assert_eq!(ed.data.to_string(), "abc");

        let text = ed.kill_ring.yank().unwrap();
        let chars: Vec<char> = text.chars().collect();
        ed.data.insert_chars(ed.pos, &chars);
        ed.pos += chars.len();
        ed.kill_ring.last_action = Action::Yank;
        ed.kill_ring.last_yank_size = chars.len();
        assert_eq!(ed.data.to_string(), "abcdef");
        assert_eq!(ed.pos, 6);

        let text = ed.kill_ring.yank_pop().unwrap();
        let chars: Vec<char> = text.chars().collect();
        ed.pos -= ed.kill_ring.last_yank_size;
        ed.data.erase_range(ed.pos, ed.kill_ring.last_yank_size);
        ed.data.insert_chars(ed.pos, &chars);
        ed.pos += chars.len();
        assert_eq!(ed.data.to_string(), "abcxyz");
        assert_eq!(ed.pos, 6);
    }

    #[test]
    fn test_hint_selection_wraps() {
        let mut ed = Editor::new();
        ed.set_hint_callback(|_input, _context, _color| {
            vec![
                String::from("commit"),
                String::from("commute"),
                String::from("common"),
            ]
        });
        ed.data.assign_str("com");
        ed.pos = 3;
        let pi = PromptInfo::new("> ", 80);

        ed.handle_hints(&pi, HintAction::Regenerate);
        assert_eq!(ed.hint_selection, -1);

        ed.hint_selection = -2;
        ed.handle_hints(&pi, HintAction::Repaint);
        assert_eq!(ed.hint_selection, 2);

        ed.hint_selection = 3;
        ed.handle_hints(&pi, HintAction::Repaint);
        assert_eq!(ed.hint_selection, -1);
    }

    #[test]
    fn test_single_hint_renders_inline() {
        let mut ed = Editor::new();
        ed.set_hint_callback(|_input, _context, _color| vec![String::from("commit")]);
        ed.data.assign_str("com");
        ed.pos = 3;
        let pi = PromptInfo::new("> ", 80);
        ed.display.clear();
        let extra = ed.handle_hints(&pi, HintAction::Regenerate);
        // the tail past the context is appended to the display
        let plain: String = ed.display.iter().filter(|c| !c.is_control()).collect();
        assert!(plain.contains("mit"));
        assert_eq!(extra, 3);
    }

    #[test]
    fn test_below_line_hints_consume_rows() {
        let mut ed = Editor::new();
        ed.set_hint_callback(|_input, _context, _color| {
            vec![String::from("commit"), String::from("common")]
        });
        ed.data.assign_str("com");
        ed.pos = 3;
        let pi = PromptInfo::new("> ", 80);
        ed.display.clear();
        ed.handle_hints(&pi, HintAction::Regenerate);
        let rows = ed.display.iter().filter(|&&c| c == '\n').count();
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_hints_skipped_when_cursor_not_at_end() {
        let mut ed = Editor::new();
        ed.set_hint_callback(|_input, _context, _color| vec![String::from("commit")]);
        ed.data.assign_str("com");
        ed.pos = 2;
        let pi = PromptInfo::new("> ", 80);
        ed.display.clear();
        assert_eq!(ed.handle_hints(&pi, HintAction::Regenerate), 0);
        assert!(ed.display.is_empty());
    }

    #[test]
    fn test_hints_skipped_without_color() {
        let mut ed = Editor::new();
        ed.set_no_color(true);
        ed.set_hint_callback(|_input, _context, _color| vec![String::from("commit")]);
        ed.data.assign_str("com");
        ed.pos = 3;
        let pi = PromptInfo::new("> ", 80);
        assert_eq!(ed.handle_hints(&pi, HintAction::Regenerate), 0);
    }

    #[test]
    fn test_build_display_colors_transitions() {
        let mut ed = Editor::new();
        ed.set_highlighter_callback(|_line, colors| {
            if !colors.is_empty() {
                colors[0] = Color::Green;
            }
        });
        ed.data.assign_str("ok");
        ed.build_display(None, false);
        let display: String = ed.display.iter().collect();
        let green = ansi_color(Color::Green);
        let reset = ansi_color(Color::Default);
        assert!(display.starts_with(green));
        assert!(display.ends_with(reset));
        assert!(display.contains('o') && display.contains('k'));
    }

    #[test]
    fn test_build_display_brace_error_color() {
        let mut ed = Editor::new();
        ed.data.assign_str("(]x)");
        ed.build_display(Some(3), true);
        let display: String = ed.display.iter().collect();
        assert!(display.contains(ansi_color(Color::Error)));

        ed.build_display(Some(3), false);
        let display: String = ed.display.iter().collect();
        assert!(display.contains(ansi_color(Color::BrightRed)));
        assert!(!display.contains(ansi_color(Color::Error)));
    }
}
