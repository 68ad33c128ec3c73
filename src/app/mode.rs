/// What the host is doing, derived from the active player and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Reading,
    Paused,
    Command,
    Quit,
}

impl AppMode {
    pub fn label(&self) -> &'static str {
        match self {
            AppMode::Reading => "READING",
            AppMode::Paused => "PAUSED",
            AppMode::Command => "COMMAND",
            AppMode::Quit => "QUIT",
        }
    }
}
