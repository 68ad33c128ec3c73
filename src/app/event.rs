/// Application events
#[derive(Debug, PartialEq, Clone)]
pub enum AppEvent {
    LoadFile(String),
    LoadClipboard,
    ListNotes,
    OpenNote(usize),
    NewNote(String),
    DeleteNote,
    SetWpm(u32),
    Quit,
    Help,
    InvalidCommand(String),
    None,
}
