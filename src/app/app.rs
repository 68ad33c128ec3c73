use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::event::AppEvent;
use super::mode::AppMode;
use super::render_state::RenderState;
use crate::engine::{
    DeadlinePacer, GlanceError, PlaybackState, Scheduler, Settings, SpeechPacer,
};
use crate::input::{self, LoadedDocument};
use crate::reading::{
    compact_count, eta, first_word_of_sentence, percent, sentence_for_word, short_date, tokenize,
    word_count, TokenMode,
};
use crate::speech::{CommandSpeech, SpeechEvent, SpeechPort};
use crate::storage::{FramePayload, Note, NoteStore};
use crate::ui::command::{command_to_app_event, parse_command};

const CONTEXT_WINDOW: usize = 3;
const SEEK_STEP: i64 = 10;
const NOTE_TITLE_CHARS: usize = 40;

const HELP_LINES: [&str; 16] = [
    "space      play / pause",
    "h l        back / forward one token",
    "H L        back / forward ten tokens",
    "j k        slower / faster",
    "s          stop and rewind",
    "m          switch word / speech mode",
    "q          quit",
    "",
    "@path      open a .txt, .epub or .pdf file",
    "@@         read the clipboard",
    ":notes     list saved notes",
    ":open N    open note N from the list",
    ":new TEXT  save TEXT as a new note",
    ":delete    delete the open note",
    ":wpm N     set the reading speed",
    ":q         quit",
];

/// Host state: the note being read, one player per token mode, and the
/// command line. Only the player for the current mode holds tokens.
pub struct App<S: SpeechPort = CommandSpeech> {
    settings: Settings,
    notes: Box<dyn NoteStore>,
    current_note: Option<Uuid>,
    saved_index: usize,
    text: String,
    word_total: usize,
    title: String,
    token_mode: TokenMode,
    reader: Scheduler<DeadlinePacer>,
    speaker: Scheduler<SpeechPacer<S>>,
    command_line: Option<String>,
    overlay: Option<Vec<String>>,
    status: Option<String>,
    quit: bool,
    dirty: Rc<Cell<bool>>,
}

impl App<CommandSpeech> {
    /// App speaking through the configured speech program.
    pub fn with_command_speech(
        settings: Settings,
        notes: Box<dyn NoteStore>,
    ) -> Result<Self, GlanceError> {
        let speech = CommandSpeech::new(settings.speech.clone());
        Self::new(settings, notes, speech)
    }
}

impl<S: SpeechPort> App<S> {
    /// Seeds an empty store with the welcome note and opens the newest note.
    pub fn new(
        settings: Settings,
        mut notes: Box<dyn NoteStore>,
        speech: S,
    ) -> Result<Self, GlanceError> {
        notes.initialize(&settings.storage.welcome_text)?;

        let mut reader = Scheduler::new(
            DeadlinePacer::new(settings.timing.clone()),
            f64::from(settings.timing.wpm),
        )?;
        let mut speaker = Scheduler::new(
            SpeechPacer::new(speech, settings.speech.voice.clone()),
            settings.speech.rate,
        )?;

        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        reader.on_change(move |_| flag.set(true));
        let flag = Rc::clone(&dirty);
        speaker.on_change(move |_| flag.set(true));

        let mut app = Self {
            settings,
            notes,
            current_note: None,
            saved_index: 0,
            text: String::new(),
            word_total: 0,
            title: String::new(),
            token_mode: TokenMode::Words,
            reader,
            speaker,
            command_line: None,
            overlay: None,
            status: None,
            quit: false,
            dirty,
        };

        if let Some(note) = app.notes.all().into_iter().next() {
            app.open(note);
        }

        Ok(app)
    }

    pub fn mode(&self) -> AppMode {
        if self.quit {
            AppMode::Quit
        } else if self.command_line.is_some() {
            AppMode::Command
        } else if self.is_playing() {
            AppMode::Reading
        } else {
            AppMode::Paused
        }
    }

    pub fn token_mode(&self) -> TokenMode {
        self.token_mode
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn notes(&self) -> &dyn NoteStore {
        self.notes.as_ref()
    }

    pub fn current_note(&self) -> Option<Note> {
        self.current_note.and_then(|id| self.notes.get(id))
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn reader(&self) -> &Scheduler<DeadlinePacer> {
        &self.reader
    }

    pub fn speaker(&self) -> &Scheduler<SpeechPacer<S>> {
        &self.speaker
    }

    #[cfg(test)]
    pub(crate) fn speech_port_mut(&mut self) -> &mut S {
        self.speaker.pacer_mut().port_mut()
    }

    /// True once since the last call if anything visible changed.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    pub fn is_playing(&self) -> bool {
        self.active_state().is_playing()
    }

    fn active_state(&self) -> &PlaybackState {
        match self.token_mode {
            TokenMode::Words => self.reader.state(),
            TokenMode::Sentences => self.speaker.state(),
        }
    }

    /// Position in words, whichever mode is active.
    pub fn word_index(&self) -> usize {
        let index = match self.token_mode {
            TokenMode::Words => self.reader.state().index(),
            TokenMode::Sentences => {
                first_word_of_sentence(&self.text, self.speaker.state().index())
            }
        };
        index.min(self.word_total)
    }

    /// How long the host may block before the next advance is due.
    pub fn poll_timeout(&self, now: Instant, max: Duration) -> Duration {
        match self.reader.pacer().next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(now).min(max),
            None => max,
        }
    }

    /// Feeds due advances and speech events to the players, then saves the
    /// position if playback has stopped.
    pub fn tick(&mut self, now: Instant) {
        if let Some(ticket) = self.reader.pacer_mut().take_due(now) {
            self.reader.complete(ticket);
        }

        while let Some(event) = self.speaker.pacer_mut().poll() {
            match event {
                SpeechEvent::Finished(ticket) => {
                    self.speaker.complete(ticket);
                }
                SpeechEvent::Failed { ticket, reason } => {
                    if self.speaker.fail(ticket) {
                        self.set_status(format!("Speech failed: {}", reason));
                    }
                }
            }
        }

        self.persist_progress();
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        if self.command_line.is_some() {
            self.handle_command_key(code);
            return;
        }

        if self.overlay.is_some() && matches!(code, KeyCode::Esc | KeyCode::Enter) {
            self.overlay = None;
            self.dirty.set(true);
            return;
        }

        match code {
            KeyCode::Char(' ') => self.toggle(),
            KeyCode::Char('h') | KeyCode::Left => self.seek(-1),
            KeyCode::Char('l') | KeyCode::Right => self.seek(1),
            KeyCode::Char('H') => self.seek(-SEEK_STEP),
            KeyCode::Char('L') => self.seek(SEEK_STEP),
            KeyCode::Char('j') | KeyCode::Down => self.adjust_rate(-1),
            KeyCode::Char('k') | KeyCode::Up => self.adjust_rate(1),
            KeyCode::Char('s') => self.stop(),
            KeyCode::Char('m') => self.switch_mode(),
            KeyCode::Char(c @ (':' | '@')) => {
                self.pause();
                self.command_line = Some(c.to_string());
                self.dirty.set(true);
            }
            KeyCode::Char('q') => self.handle_event(AppEvent::Quit),
            KeyCode::Esc => {
                self.status = None;
                self.dirty.set(true);
            }
            _ => {}
        }
    }

    fn handle_command_key(&mut self, code: KeyCode) {
        let Some(line) = self.command_line.as_mut() else {
            return;
        };

        match code {
            KeyCode::Esc => self.command_line = None,
            KeyCode::Backspace => {
                line.pop();
                if line.is_empty() {
                    self.command_line = None;
                }
            }
            KeyCode::Enter => {
                let input = self.command_line.take().unwrap_or_default();
                self.handle_event(command_to_app_event(parse_command(&input)));
            }
            KeyCode::Char(c) => line.push(c),
            _ => {}
        }

        self.dirty.set(true);
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::LoadFile(path) => match input::load_path(expand_home(&path)) {
                Ok(document) => self.load_document(document),
                Err(error) => self.report(error),
            },
            AppEvent::LoadClipboard => match input::clipboard::load() {
                Ok(document) => self.load_document(document),
                Err(error) => self.report(error),
            },
            AppEvent::ListNotes => {
                self.overlay = Some(self.note_lines());
                self.set_status("Open a note with :open N".to_string());
            }
            AppEvent::OpenNote(number) => {
                let note = number
                    .checked_sub(1)
                    .and_then(|i| self.notes.all().into_iter().nth(i));
                match note {
                    Some(note) => {
                        self.overlay = None;
                        self.open(note);
                    }
                    None => self.set_status(format!("No note {}", number)),
                }
            }
            AppEvent::NewNote(text) => {
                if text.trim().is_empty() {
                    self.set_status("Usage: :new <text>".to_string());
                } else {
                    match self.notes.create(&text) {
                        Ok(note) => self.open(note),
                        Err(error) => self.report(error),
                    }
                }
            }
            AppEvent::DeleteNote => self.delete_current(),
            AppEvent::SetWpm(wpm) => self.set_wpm(wpm),
            AppEvent::Help => {
                self.overlay = Some(HELP_LINES.iter().map(|l| l.to_string()).collect());
            }
            AppEvent::Quit => {
                self.pause();
                self.persist_progress();
                self.quit = true;
            }
            AppEvent::InvalidCommand(input) => {
                self.set_status(format!("Unknown command: {}", input));
            }
            AppEvent::None => {}
        }

        self.dirty.set(true);
    }

    /// Saves the document as a new note and opens it.
    pub fn load_document(&mut self, document: LoadedDocument) {
        match self.notes.create(&document.text) {
            Ok(note) => {
                info!(source = %document.source, "opened document as note");
                self.open(note);
                self.set_status(format!("Loaded {}", document.source));
            }
            Err(error) => self.report(error),
        }
    }

    /// Saves a launcher payload as a new note positioned at its `current` word.
    pub fn load_payload(&mut self, payload: FramePayload) -> Result<(), GlanceError> {
        let mut note = self.notes.create(&payload.text)?;
        if payload.current > 0 {
            self.notes.set_saved_index(note.id, payload.current)?;
            note.saved_index = payload.current;
        }
        self.open(note);
        Ok(())
    }

    pub fn toggle(&mut self) {
        match self.token_mode {
            TokenMode::Words => self.reader.toggle(),
            TokenMode::Sentences => self.speaker.toggle(),
        }
    }

    pub fn pause(&mut self) {
        self.reader.pause();
        self.speaker.pause();
    }

    pub fn stop(&mut self) {
        match self.token_mode {
            TokenMode::Words => self.reader.stop(),
            TokenMode::Sentences => self.speaker.stop(),
        }
    }

    pub fn seek(&mut self, delta: i64) {
        match self.token_mode {
            TokenMode::Words => self.reader.seek(delta),
            TokenMode::Sentences => self.speaker.seek(delta),
        }
    }

    pub fn set_wpm(&mut self, wpm: u32) {
        let wpm = self.settings.timing.clamp_wpm(i64::from(wpm));
        match self.reader.set_rate(f64::from(wpm)) {
            Ok(()) => self.set_status(format!("{} wpm", wpm)),
            Err(error) => self.report(error),
        }
    }

    fn adjust_rate(&mut self, steps: i64) {
        match self.token_mode {
            TokenMode::Words => {
                let timing = &self.settings.timing;
                let current = self.reader.state().rate().round() as i64;
                let wpm = timing.clamp_wpm(current + steps * i64::from(timing.wpm_step));
                self.set_wpm(wpm);
            }
            TokenMode::Sentences => {
                let speech = &self.settings.speech;
                let rate = speech.clamp_rate(self.speaker.state().rate() + steps as f64 * speech.rate_step);
                let rate = (rate * 100.0).round() / 100.0;
                match self.speaker.set_rate(rate) {
                    Ok(()) => self.set_status(format!("{:.1}x speech", rate)),
                    Err(error) => self.report(error),
                }
            }
        }
    }

    /// Moves between word and speech mode, keeping the reading position.
    pub fn switch_mode(&mut self) {
        let word = self.word_index();
        self.pause();

        match self.token_mode {
            TokenMode::Words => {
                self.token_mode = TokenMode::Sentences;
                self.reader.load(Vec::new());
                self.set_status("Speech mode".to_string());
            }
            TokenMode::Sentences => {
                self.token_mode = TokenMode::Words;
                self.speaker.load(Vec::new());
                self.set_status("Word mode".to_string());
            }
        }

        self.load_text_at(word);
    }

    fn open(&mut self, note: Note) {
        self.pause();
        self.persist_progress();

        debug!(id = %note.id, saved_index = note.saved_index, "opening note");
        self.current_note = Some(note.id);
        self.saved_index = note.saved_index;
        self.title = note.title(NOTE_TITLE_CHARS);
        self.word_total = word_count(&note.text);
        self.text = note.text;
        self.load_text_at(self.saved_index);
    }

    fn load_text_at(&mut self, word: usize) {
        let tokens = tokenize(&self.text, self.token_mode);
        match self.token_mode {
            TokenMode::Words => {
                self.reader.load(tokens);
                self.reader.seek_to(word);
            }
            TokenMode::Sentences => {
                self.speaker.load(tokens);
                self.speaker.seek_to(sentence_for_word(&self.text, word));
            }
        }
    }

    fn delete_current(&mut self) {
        let Some(id) = self.current_note else {
            self.set_status("No note open".to_string());
            return;
        };

        self.pause();
        if let Err(error) = self.notes.delete(id) {
            self.report(error);
            return;
        }
        self.current_note = None;
        if let Err(error) = self.notes.initialize(&self.settings.storage.welcome_text) {
            self.report(error);
            return;
        }

        if let Some(note) = self.notes.all().into_iter().next() {
            self.open(note);
        }
        self.set_status("Note deleted".to_string());
    }

    /// Writes the word position of the open note once playback has stopped.
    pub fn persist_progress(&mut self) {
        if self.is_playing() {
            return;
        }
        let Some(id) = self.current_note else {
            return;
        };

        let index = self.word_index();
        if index == self.saved_index {
            return;
        }

        // Recorded even on failure so a broken store is reported once.
        self.saved_index = index;
        match self.notes.set_saved_index(id, index) {
            Ok(()) => debug!(%id, index, "saved reading position"),
            Err(error) => self.report(error),
        }
    }

    pub fn render_state(&self) -> RenderState {
        let state = self.active_state();
        let window = match self.token_mode {
            TokenMode::Words => CONTEXT_WINDOW,
            TokenMode::Sentences => 0,
        };

        let word = self.word_index();
        let mut render = RenderState::from_playback(self.mode(), self.token_mode, state, window);
        render.percent = percent(&self.text, word);
        render.eta = eta(word, self.word_total);
        render.rate_label = match self.token_mode {
            TokenMode::Words => format!("{} wpm", state.rate().round()),
            TokenMode::Sentences => format!("{:.1}x speech", state.rate()),
        };
        render.title = self.title.clone();
        render.status = self.status.clone();
        render.command_line = self.command_line.clone();
        render.overlay = self.overlay.clone();
        render
    }

    fn note_lines(&self) -> Vec<String> {
        self.notes
            .all()
            .iter()
            .enumerate()
            .map(|(i, note)| {
                let marker = if Some(note.id) == self.current_note { '*' } else { ' ' };
                format!(
                    "{}{:>3}. {:<width$}  {:>5.1}%  {:>5} words  {}",
                    marker,
                    i + 1,
                    note.title(NOTE_TITLE_CHARS),
                    note.percent_read(),
                    compact_count(note.word_count() as u64),
                    short_date(&note.last_modified),
                    width = NOTE_TITLE_CHARS,
                )
            })
            .collect()
    }

    fn set_status(&mut self, message: String) {
        self.status = Some(message);
        self.dirty.set(true);
    }

    fn report(&mut self, error: impl Into<GlanceError>) {
        let error = error.into();
        warn!(%error, "command failed");
        self.set_status(error.to_string());
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
