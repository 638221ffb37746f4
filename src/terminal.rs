use std::env;
use std::io::{self, Write};
use std::mem::zeroed;

use libc::{winsize, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO, TIOCGWINSZ};
use nix::sys::termios::{self, ControlFlags, InputFlags, LocalFlags, SetArg,
                        SpecialCharacterIndices, Termios};

// Terminals where cursor addressing does not work; input falls back to
// plain line-buffered stdin for these.
const UNSUPPORTED_TERMS: &[&str] = &["dumb", "cons25", "emacs"];

fn nix_err(e: nix::Error) -> io::Error {
    io::Error::from_raw_os_error(e as i32)
}

pub fn stdin_is_tty() -> bool {
    unsafe { libc::isatty(STDIN_FILENO) == 1 }
}

pub fn is_unsupported_term() -> bool {
    match env::var("TERM") {
        Ok(term) => UNSUPPORTED_TERMS.iter().any(|&t| term.eq_ignore_ascii_case(t)),
        Err(_) => false,
    }
}

/// Probe stdout, then stdin, then stderr for the window size. Returns
/// `None` when none of them is a terminal.
fn dimensions() -> Option<(usize, usize)> {
    let mut window: winsize = unsafe { zeroed() };
    for fd in [STDOUT_FILENO, STDIN_FILENO, STDERR_FILENO] {
        let result = unsafe { libc::ioctl(fd, TIOCGWINSZ, &mut window) };
        if result != -1 && window.ws_col != 0 && window.ws_row != 0 {
            return Some((window.ws_col as usize, window.ws_row as usize));
        }
        window = unsafe { zeroed() };
    }
    None
}

pub fn screen_columns() -> usize {
    match dimensions() {
        Some((cols, _)) => cols,
        None => 80,
    }
}

pub fn screen_rows() -> usize {
    match dimensions() {
        Some((_, rows)) => rows,
        None => 24,
    }
}

/// Holds the termios settings that were active before raw mode was
/// entered, and restores them when dropped. Dropping is the only way raw
/// mode ends, so every exit path out of the edit loop leaves the terminal
/// usable.
pub struct RawModeGuard {
    saved: Termios,
}

impl RawModeGuard {
    pub fn enter() -> io::Result<RawModeGuard> {
        if !stdin_is_tty() {
            return Err(io::Error::new(io::ErrorKind::Other, "stdin is not a tty"));
        }
        let saved = termios::tcgetattr(STDIN_FILENO).map_err(nix_err)?;
        let guard = RawModeGuard { saved };
        guard.resume()?;
        Ok(guard)
    }

    /// Re-apply raw mode after a suspend.
    pub fn resume(&self) -> io::Result<()> {
        let mut raw = self.saved.clone();
        raw.input_flags.remove(
            InputFlags::BRKINT
                | InputFlags::ICRNL
                | InputFlags::INPCK
                | InputFlags::ISTRIP
                | InputFlags::IXON,
        );
        raw.control_flags.insert(ControlFlags::CS8);
        raw.local_flags.remove(
            LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG,
        );
        // one byte at a time, no timeout
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        termios::tcsetattr(STDIN_FILENO, SetArg::TCSADRAIN, &raw).map_err(nix_err)
    }

    /// Restore the original settings without consuming the guard, for
    /// Ctrl-Z job control.
    pub fn suspend(&self) -> io::Result<()> {
        termios::tcsetattr(STDIN_FILENO, SetArg::TCSADRAIN, &self.saved).map_err(nix_err)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = termios::tcsetattr(STDIN_FILENO, SetArg::TCSADRAIN, &self.saved) {
            log!("tcsetattr restore error: {:?}", e);
        }
    }
}

pub fn write_str(s: &str) -> io::Result<()> {
    let mut out = io::stdout();
    out.write_all(s.as_bytes())?;
    out.flush()
}

pub fn write_chars(chars: &[char]) -> io::Result<()> {
    let s: String = chars.iter().collect();
    write_str(&s)
}

pub fn move_cursor_up(rows: usize) -> io::Result<()> {
    write_str(&format!("\x1b[{}A", rows))
}

/// Column is 1-based, as VT100 wants it.
pub fn cursor_to_column(column: usize) -> io::Result<()> {
    write_str(&format!("\x1b[{}G", column))
}

pub fn clear_to_screen_end() -> io::Result<()> {
    write_str("\x1b[J")
}

pub fn clear_whole_screen() -> io::Result<()> {
    write_str("\x1b[H\x1b[2J")
}

pub fn beep() {
    let mut err = io::stderr();
    let _ = err.write_all(b"\x07");
    let _ = err.flush();
}
