//! Interactive demo: command-word highlighting backed by a PATH scan,
//! completion and hints over the same command list, persistent history.
//!
//! Run with `cargo run --example repl`, type away, `exit` or Ctrl-D to
//! leave.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Mutex;

use lazy_static::lazy_static;

use katydid::{default_history_file, Color, Editor, ReadResult};

lazy_static! {
    static ref AVAILABLE_COMMANDS: Mutex<HashSet<String>> = Mutex::new(HashSet::new());
}

fn init_command_cache() {
    let commands = scan_available_commands();
    if let Ok(mut cache) = AVAILABLE_COMMANDS.lock() {
        *cache = commands;
    }
}

fn scan_available_commands() -> HashSet<String> {
    let mut commands = HashSet::new();

    if let Ok(path_var) = env::var("PATH") {
        for path in path_var.split(':') {
            if path.is_empty() {
                continue;
            }

            let dir_path = Path::new(path);
            if !dir_path.is_dir() {
                continue;
            }

            if let Ok(entries) = fs::read_dir(dir_path) {
                for entry in entries.filter_map(Result::ok) {
                    if let Ok(metadata) = entry.metadata() {
                        if metadata.permissions().mode() & 0o111 != 0 {
                            if let Some(name) = entry.file_name().to_str() {
                                commands.insert(name.to_string());
                            }
                        }
                    }
                }
            }
        }
    }

    commands
}

fn is_known_command(word: &str) -> bool {
    match AVAILABLE_COMMANDS.lock() {
        Ok(commands) => commands.contains(word),
        Err(_) => false,
    }
}

fn commands_with_prefix(prefix: &str) -> Vec<String> {
    let mut matches: Vec<String> = match AVAILABLE_COMMANDS.lock() {
        Ok(commands) => commands
            .iter()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect(),
        Err(_) => Vec::new(),
    };
    matches.sort();
    matches
}

fn main() -> io::Result<()> {
    init_command_cache();

    let mut editor = Editor::new();
    editor.install_window_change_handler()?;

    let history_file = default_history_file();
    let _ = editor.history_load(&history_file);

    // color the command word green when it resolves to something on PATH
    editor.set_highlighter_callback(|line: &str, colors: &mut Vec<Color>| {
        let first_word: String = line.chars().take_while(|c| !c.is_whitespace()).collect();
        if first_word.is_empty() || !is_known_command(&first_word) {
            return;
        }
        let word_len = first_word.chars().count();
        for color in colors.iter_mut().take(word_len) {
            *color = Color::Green;
        }
    });

    editor.set_completion_callback(|prefix: &str, context_len: &mut usize| {
        let word: String = prefix
            .chars()
            .rev()
            .take(*context_len)
            .collect::<Vec<char>>()
            .into_iter()
            .rev()
            .collect();
        commands_with_prefix(&word)
    });

    editor.set_hint_callback(|prefix: &str, context_len: &mut usize, _color: &mut Color| {
        let word: String = prefix
            .chars()
            .rev()
            .take(*context_len)
            .collect::<Vec<char>>()
            .into_iter()
            .rev()
            .collect();
        if word.len() < 2 {
            return Vec::new();
        }
        commands_with_prefix(&word)
    });

    loop {
        match editor.input("katydid> ")? {
            ReadResult::Input(line) => {
                if line.trim() == "exit" {
                    break;
                }
                if line.trim().is_empty() {
                    continue;
                }
                editor.history_add(&line);
                println!("=> {}", line);
            }
            ReadResult::Interrupted => continue,
            ReadResult::Eof => {
                println!("bye");
                break;
            }
        }
    }

    if let Err(e) = editor.history_save(&history_file) {
        eprintln!("katydid: failed to save history: {}", e);
    }
    Ok(())
}
