//! Command parsing for the command line
//!
//! - `:q` / `:quit`, `:h` / `:help`
//! - `:notes`, `:open N`, `:new TEXT`, `:delete`
//! - `:wpm N`
//! - `@path` loads a file, `@@` (or a bare `@`) loads the clipboard

use crate::app::AppEvent;

/// Commands that can be parsed from command line input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Help,
    LoadFile(String),
    LoadClipboard,
    ListNotes,
    OpenNote(usize),
    NewNote(String),
    DeleteNote,
    SetWpm(u32),
    Unknown(String),
}

pub fn parse_command(input: &str) -> Command {
    let input = input.trim();

    if input.is_empty() {
        return Command::Unknown(input.to_string());
    }

    if let Some(cmd) = input.strip_prefix(':') {
        let (name, arg) = match cmd.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (cmd, ""),
        };

        match (name, arg) {
            ("q" | "quit", "") => Command::Quit,
            ("h" | "help", "") => Command::Help,
            ("notes" | "ls", "") => Command::ListNotes,
            ("delete" | "rm", "") => Command::DeleteNote,
            ("open" | "o", n) => n
                .parse()
                .map(Command::OpenNote)
                .unwrap_or_else(|_| Command::Unknown(input.to_string())),
            ("wpm", n) => n
                .parse()
                .map(Command::SetWpm)
                .unwrap_or_else(|_| Command::Unknown(input.to_string())),
            ("new", text) => Command::NewNote(text.to_string()),
            _ => Command::Unknown(input.to_string()),
        }
    } else if let Some(rest) = input.strip_prefix('@') {
        let filename = rest.trim();
        if filename.is_empty() || filename == "@" {
            Command::LoadClipboard
        } else {
            Command::LoadFile(filename.to_string())
        }
    } else {
        Command::Unknown(input.to_string())
    }
}

/// Convert a parsed command into an AppEvent
pub fn command_to_app_event(command: Command) -> AppEvent {
    match command {
        Command::Quit => AppEvent::Quit,
        Command::Help => AppEvent::Help,
        Command::LoadFile(path) => AppEvent::LoadFile(path),
        Command::LoadClipboard => AppEvent::LoadClipboard,
        Command::ListNotes => AppEvent::ListNotes,
        Command::OpenNote(n) => AppEvent::OpenNote(n),
        Command::NewNote(text) => AppEvent::NewNote(text),
        Command::DeleteNote => AppEvent::DeleteNote,
        Command::SetWpm(wpm) => AppEvent::SetWpm(wpm),
        Command::Unknown(input) => AppEvent::InvalidCommand(input),
    }
}
