//! An interactive line editor for Unix terminals: Emacs-style editing
//! over a UTF-8 buffer, syntax highlighting hooks, hint overlays, tab
//! completion with common-prefix expansion and paginated listing, a
//! kill-ring, and incremental / common-prefix history search.
//!
//! The caller supplies a prompt and optional callbacks; `input()` runs
//! one interactive read and returns the committed line, EOF, or an
//! abort.
//!
//! ```no_run
//! use katydid::{Editor, ReadResult};
//!
//! fn main() -> std::io::Result<()> {
//!     let mut editor = Editor::new();
//!     editor.install_window_change_handler()?;
//!     loop {
//!         match editor.input(">>> ")? {
//!             ReadResult::Input(line) => {
//!                 editor.history_add(&line);
//!                 println!("got: {}", line);
//!             }
//!             ReadResult::Interrupted => continue,
//!             ReadResult::Eof => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! When stdin is not a terminal, or `TERM` is one of the unsupported
//! names (`dumb`, `cons25`, `emacs`), `input()` falls back to plain
//! line-buffered reads.

#![allow(dead_code)]

#[macro_use]
mod tlog;

mod editor;
mod highlight;
mod history;
mod keys;
mod killring;
mod prompt;
mod screen;
mod signals;
mod terminal;
mod unicode;

pub use crate::editor::{Editor, ReadResult};
pub use crate::highlight::Color;
pub use crate::history::default_history_file;
