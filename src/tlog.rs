//! Debug trace, enabled by naming a file in `KATYDID_LOG_FILE`.
//! Writing is best-effort: a logging failure must never disturb the
//! terminal session it is describing, so the macro discards errors
//! instead of surfacing them into the edit loop.

use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};

use time::OffsetDateTime;

pub fn log_file() -> Option<String> {
    match env::var("KATYDID_LOG_FILE") {
        Ok(path) if !path.is_empty() => Some(path),
        _ => None,
    }
}

pub fn append(path: &str, message: &str) -> io::Result<()> {
    let now = match OffsetDateTime::now_local() {
        Ok(dt) => dt,
        Err(_) => OffsetDateTime::now_utc(),
    };
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    writeln!(
        file,
        "{:02}:{:02}:{:02}.{:03} [{}] {}",
        now.hour(),
        now.minute(),
        now.second(),
        now.millisecond(),
        std::process::id(),
        message.trim_end()
    )
}

macro_rules! log {
    ($($arg:tt)*) => {
        if let Some(path) = crate::tlog::log_file() {
            let _ = crate::tlog::append(&path, &format!($($arg)*));
        }
    };
}
