//! Playback scheduler: owns a token sequence, a position, a rate and exactly
//! one armed advance while playing.
//!
//! Every arm or cancel bumps an epoch. Tickets carry the epoch they were armed
//! with, so a completion that arrives after `pause`, `seek` or `load` is
//! recognised as stale and dropped.

use tracing::{debug, trace, warn};

use crate::engine::error::PlaybackError;
use crate::engine::listeners::{ListenerId, Listeners};
use crate::engine::pacer::Pacer;

/// Handle for one armed advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    index: usize,
}

impl Ticket {
    pub(crate) fn new(epoch: u64, index: usize) -> Self {
        Self { epoch, index }
    }
}

/// Read-only view handed to listeners and the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    tokens: Vec<String>,
    index: usize,
    rate: f64,
    playing: bool,
}

impl PlaybackState {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.tokens.len()
    }

    /// Token at the current index, or "" past the end.
    pub fn current_token(&self) -> &str {
        self.tokens.get(self.index).map_or("", String::as_str)
    }

    pub fn progress_percent(&self) -> f64 {
        if self.tokens.is_empty() {
            return 0.0;
        }
        self.index as f64 / self.tokens.len() as f64 * 100.0
    }

    fn last_index(&self) -> usize {
        self.tokens.len().saturating_sub(1)
    }
}

fn validate_rate(rate: f64) -> Result<f64, PlaybackError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(PlaybackError::InvalidRate(rate))
    }
}

pub struct Scheduler<P: Pacer> {
    state: PlaybackState,
    pacer: P,
    listeners: Listeners<PlaybackState>,
    epoch: u64,
}

impl<P: Pacer> Scheduler<P> {
    pub fn new(pacer: P, rate: f64) -> Result<Self, PlaybackError> {
        Ok(Self {
            state: PlaybackState {
                tokens: Vec::new(),
                index: 0,
                rate: validate_rate(rate)?,
                playing: false,
            },
            pacer,
            listeners: Listeners::new(),
            epoch: 0,
        })
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Mutable access for hosts that collect completions from the pacer.
    /// Arming or disarming through this reference bypasses the scheduler.
    pub fn pacer_mut(&mut self) -> &mut P {
        &mut self.pacer
    }

    pub fn on_change(&mut self, listener: impl FnMut(&PlaybackState) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Replaces the sequence and rewinds. An empty sequence cannot play.
    pub fn load(&mut self, tokens: Vec<String>) {
        self.cancel();
        debug!(tokens = tokens.len(), "loading token sequence");
        self.state.tokens = tokens;
        self.state.index = 0;
        self.notify();
    }

    pub fn play(&mut self) {
        if self.state.playing || self.state.is_finished() {
            return;
        }

        debug!(index = self.state.index, rate = self.state.rate, "play");
        self.state.playing = true;
        self.notify();
        self.arm();
    }

    pub fn pause(&mut self) {
        self.cancel();
        self.notify();
    }

    pub fn toggle(&mut self) {
        if self.state.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn stop(&mut self) {
        self.pause();
        self.state.index = 0;
        self.notify();
    }

    /// Moves relative to the current token, clamped to the sequence. Pauses.
    pub fn seek(&mut self, delta: i64) {
        self.pause();
        let target = (self.state.index as i64).saturating_add(delta);
        self.state.index = target.clamp(0, self.state.last_index() as i64) as usize;
        debug!(delta, index = self.state.index, "seek");
        self.notify();
    }

    /// Moves to an absolute token, clamped to the sequence. Pauses.
    pub fn seek_to(&mut self, index: usize) {
        self.pause();
        self.state.index = index.min(self.state.last_index());
        self.notify();
    }

    /// Takes effect from the next armed advance; the pending one keeps its timing.
    pub fn set_rate(&mut self, rate: f64) -> Result<(), PlaybackError> {
        self.state.rate = validate_rate(rate)?;
        debug!(rate, "rate changed");
        self.notify();
        Ok(())
    }

    /// Moves to `index` (clamped) and plays from there.
    pub fn jump_to(&mut self, index: usize) {
        self.pause();
        self.state.index = index.min(self.state.last_index());
        debug!(index = self.state.index, "jump");
        self.play();
    }

    /// Completion of the armed advance. Returns false for stale tickets.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if !self.accepts(ticket) {
            trace!(?ticket, epoch = self.epoch, "dropping stale completion");
            return false;
        }

        self.state.index += 1;

        if self.state.is_finished() {
            debug!("reached end of sequence");
            self.cancel();
            self.notify();
        } else {
            self.notify();
            self.arm();
        }

        true
    }

    /// The armed advance failed (speech error). Pauses without advancing;
    /// returns false for stale tickets.
    pub fn fail(&mut self, ticket: Ticket) -> bool {
        if !self.accepts(ticket) {
            trace!(?ticket, epoch = self.epoch, "dropping stale failure");
            return false;
        }

        warn!(index = self.state.index, "advance failed, pausing");
        self.pause();
        true
    }

    fn accepts(&self, ticket: Ticket) -> bool {
        self.state.playing && ticket.epoch == self.epoch && ticket.index == self.state.index
    }

    fn arm(&mut self) {
        self.epoch += 1;
        let ticket = Ticket::new(self.epoch, self.state.index);
        let token = &self.state.tokens[self.state.index];
        self.pacer.arm(ticket, token, self.state.rate);
    }

    fn cancel(&mut self) {
        self.pacer.disarm();
        self.epoch += 1;
        self.state.playing = false;
    }

    fn notify(&mut self) {
        self.listeners.notify(&self.state);
    }
}

impl<P: Pacer> Drop for Scheduler<P> {
    fn drop(&mut self) {
        self.pacer.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::TimingConfig;
    use crate::engine::pacer::{DeadlinePacer, SpeechPacer};
    use crate::reading::token::{tokenize_sentences, tokenize_words};
    use crate::speech::testing::ScriptedSpeech;
    use crate::speech::SpeechEvent;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    type WordScheduler = Scheduler<DeadlinePacer>;

    fn words(text: &str) -> Vec<String> {
        tokenize_words(text)
    }

    fn scheduler_with(text: &str) -> WordScheduler {
        let mut scheduler = Scheduler::new(DeadlinePacer::new(TimingConfig::default()), 300.0).unwrap();
        scheduler.load(words(text));
        scheduler
    }

    fn far_future() -> Instant {
        Instant::now() + Duration::from_secs(3600)
    }

    /// Fires the armed deadline, if any. Returns whether one fired.
    fn fire(scheduler: &mut WordScheduler) -> bool {
        match scheduler.pacer_mut().take_due(far_future()) {
            Some(ticket) => scheduler.complete(ticket),
            None => false,
        }
    }

    fn run_to_end(scheduler: &mut WordScheduler) -> Vec<String> {
        let mut seen = vec![scheduler.state().current_token().to_string()];
        while fire(scheduler) {
            if !scheduler.state().is_finished() {
                seen.push(scheduler.state().current_token().to_string());
            }
        }
        seen
    }

    fn count_notifications(scheduler: &mut WordScheduler) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        scheduler.on_change(move |_| c.set(c.get() + 1));
        count
    }

    fn assert_single_outstanding(scheduler: &WordScheduler) {
        assert_eq!(scheduler.state().is_playing(), scheduler.pacer().is_armed());
    }

    #[test]
    fn test_new_rejects_invalid_rate() {
        let pacer = DeadlinePacer::new(TimingConfig::default());
        assert!(matches!(
            Scheduler::new(pacer, 0.0),
            Err(PlaybackError::InvalidRate(_))
        ));
    }

    #[test]
    fn test_load_resets_state() {
        let mut scheduler = scheduler_with("one two three");
        scheduler.play();
        fire(&mut scheduler);
        assert_eq!(scheduler.state().index(), 1);

        scheduler.load(words("four five"));
        assert_eq!(scheduler.state().index(), 0);
        assert!(!scheduler.state().is_playing());
        assert!(!scheduler.pacer().is_armed());
        assert_eq!(scheduler.state().current_token(), "four");
    }

    #[test]
    fn test_load_notifies() {
        let mut scheduler = scheduler_with("");
        let count = count_notifications(&mut scheduler);
        scheduler.load(words("a b"));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_empty_sequence_cannot_play() {
        let mut scheduler = scheduler_with("");
        let count = count_notifications(&mut scheduler);
        scheduler.play();
        assert!(!scheduler.state().is_playing());
        assert!(!scheduler.pacer().is_armed());
        assert_eq!(scheduler.state().current_token(), "");
        assert_eq!(scheduler.state().progress_percent(), 0.0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_play_notifies_before_first_delay() {
        let mut scheduler = scheduler_with("a b");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        scheduler.on_change(move |state| s.borrow_mut().push((state.index(), state.is_playing())));

        scheduler.play();
        assert_eq!(*seen.borrow(), vec![(0, true)]);
        assert_single_outstanding(&scheduler);
    }

    #[test]
    fn test_play_twice_keeps_single_timer() {
        let mut scheduler = scheduler_with("a b c");
        scheduler.play();
        let first = scheduler.pacer().next_deadline();
        scheduler.play();
        assert_eq!(scheduler.pacer().next_deadline(), first);
        assert!(fire(&mut scheduler));
        assert_eq!(scheduler.state().index(), 1);
    }

    #[test]
    fn test_play_to_completion() {
        for n in 1..=6 {
            let text = vec!["word"; n].join(" ");
            let mut scheduler = scheduler_with(&text);
            scheduler.play();
            while fire(&mut scheduler) {
                assert_single_outstanding(&scheduler);
            }
            assert_eq!(scheduler.state().index(), n);
            assert!(!scheduler.state().is_playing());
            assert!(scheduler.state().is_finished());
            assert_eq!(scheduler.state().current_token(), "");
            assert_eq!(scheduler.state().progress_percent(), 100.0);
        }
    }

    #[test]
    fn test_play_at_end_is_noop() {
        let mut scheduler = scheduler_with("a");
        scheduler.play();
        fire(&mut scheduler);
        assert!(scheduler.state().is_finished());

        scheduler.play();
        assert!(!scheduler.state().is_playing());
        assert!(!scheduler.pacer().is_armed());
    }

    #[test]
    fn test_pause_before_fire_prevents_advance() {
        let mut scheduler = scheduler_with("a b c");
        scheduler.play();
        let ticket = scheduler.pacer_mut().take_due(far_future()).unwrap();

        scheduler.pause();
        assert!(!scheduler.complete(ticket));
        assert_eq!(scheduler.state().index(), 0);
        assert!(!fire(&mut scheduler));
        assert_eq!(scheduler.state().index(), 0);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut once = scheduler_with("a b c");
        once.play();
        once.pause();

        let mut twice = scheduler_with("a b c");
        twice.play();
        twice.pause();
        twice.pause();

        assert_eq!(once.state(), twice.state());
        assert_eq!(once.pacer().is_armed(), twice.pacer().is_armed());
    }

    #[test]
    fn test_toggle() {
        let mut scheduler = scheduler_with("a b");
        scheduler.toggle();
        assert!(scheduler.state().is_playing());
        scheduler.toggle();
        assert!(!scheduler.state().is_playing());
        assert_single_outstanding(&scheduler);
    }

    #[test]
    fn test_stop_rewinds() {
        let mut scheduler = scheduler_with("a b c");
        scheduler.play();
        fire(&mut scheduler);
        fire(&mut scheduler);
        scheduler.stop();
        assert_eq!(scheduler.state().index(), 0);
        assert!(!scheduler.state().is_playing());
        assert!(!scheduler.pacer().is_armed());
    }

    #[test]
    fn test_seek_clamps_for_any_delta() {
        for n in 1..=5usize {
            let text = vec!["w"; n].join(" ");
            for start in 0..n {
                for delta in [-100i64, -3, -1, 0, 1, 2, 7, i64::MAX, i64::MIN] {
                    let mut scheduler = scheduler_with(&text);
                    scheduler.seek_to(start);
                    scheduler.seek(delta);
                    let index = scheduler.state().index();
                    assert!(index < n, "n={} start={} delta={} index={}", n, start, delta, index);
                }
            }
        }
    }

    #[test]
    fn test_seek_pauses_and_does_not_resume() {
        let mut scheduler = scheduler_with("a b c d");
        scheduler.play();
        scheduler.seek(2);
        assert_eq!(scheduler.state().index(), 2);
        assert!(!scheduler.state().is_playing());
        assert!(!scheduler.pacer().is_armed());
    }

    #[test]
    fn test_seek_from_finished_lands_on_last_token() {
        let mut scheduler = scheduler_with("a b");
        scheduler.play();
        while fire(&mut scheduler) {}
        scheduler.seek(0);
        assert_eq!(scheduler.state().index(), 1);
        assert_eq!(scheduler.state().current_token(), "b");
    }

    #[test]
    fn test_seek_on_empty_stays_at_zero() {
        let mut scheduler = scheduler_with("");
        scheduler.seek(5);
        assert_eq!(scheduler.state().index(), 0);
        scheduler.seek(-5);
        assert_eq!(scheduler.state().index(), 0);
    }

    #[test]
    fn test_set_rate_applies_on_next_tick() {
        let mut scheduler = scheduler_with("one two three");
        scheduler.play();
        assert_eq!(scheduler.pacer().pending_delay(), Some(Duration::from_millis(200)));

        scheduler.set_rate(600.0).unwrap();
        assert_eq!(scheduler.pacer().pending_delay(), Some(Duration::from_millis(200)));

        fire(&mut scheduler);
        assert_eq!(scheduler.pacer().pending_delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_set_rate_rejects_non_positive() {
        let mut scheduler = scheduler_with("a");
        assert!(scheduler.set_rate(-5.0).is_err());
        assert!(scheduler.set_rate(f64::NAN).is_err());
        assert_eq!(scheduler.state().rate(), 300.0);
    }

    #[test]
    fn test_set_rate_notifies() {
        let mut scheduler = scheduler_with("a");
        let count = count_notifications(&mut scheduler);
        scheduler.set_rate(400.0).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_jump_to_plays_from_index() {
        let mut scheduler = scheduler_with("a b c d");
        scheduler.jump_to(2);
        assert_eq!(scheduler.state().index(), 2);
        assert!(scheduler.state().is_playing());
        assert_single_outstanding(&scheduler);
    }

    #[test]
    fn test_jump_to_clamps() {
        let mut scheduler = scheduler_with("a b c");
        scheduler.jump_to(99);
        assert_eq!(scheduler.state().index(), 2);
        assert!(scheduler.state().is_playing());
    }

    #[test]
    fn test_round_trip_visits_every_token_in_order() {
        let text = "The quick brown fox, surprisingly, jumps. Over the dog!";
        let mut scheduler = scheduler_with(text);
        scheduler.play();
        assert_eq!(run_to_end(&mut scheduler), tokenize_words(text));
    }

    #[test]
    fn test_advance_notifies_each_index() {
        let mut scheduler = scheduler_with("a b c");
        let indices = Rc::new(RefCell::new(Vec::new()));
        let i = Rc::clone(&indices);
        scheduler.on_change(move |state| i.borrow_mut().push(state.index()));

        scheduler.play();
        while fire(&mut scheduler) {}
        assert_eq!(*indices.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_unsubscribed_listener_does_not_affect_playback() {
        let mut scheduler = scheduler_with("a b");
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let id = scheduler.on_change(move |_| c.set(c.get() + 1));

        scheduler.play();
        assert!(scheduler.unsubscribe(id));
        while fire(&mut scheduler) {}

        assert_eq!(count.get(), 1);
        assert!(scheduler.state().is_finished());
    }

    #[test]
    fn test_complete_when_idle_is_ignored() {
        let mut scheduler = scheduler_with("a b");
        assert!(!scheduler.complete(Ticket::new(0, 0)));
        assert_eq!(scheduler.state().index(), 0);
    }

    #[test]
    fn test_drop_disarms_pacer() {
        struct Flagged(Rc<Cell<bool>>);
        impl Pacer for Flagged {
            fn arm(&mut self, _: Ticket, _: &str, _: f64) {
                self.0.set(true);
            }
            fn disarm(&mut self) {
                self.0.set(false);
            }
        }

        let armed = Rc::new(Cell::new(false));
        let mut scheduler = Scheduler::new(Flagged(Rc::clone(&armed)), 300.0).unwrap();
        scheduler.load(words("a b"));
        scheduler.play();
        assert!(armed.get());

        drop(scheduler);
        assert!(!armed.get());
    }

    fn speech_scheduler(text: &str) -> Scheduler<SpeechPacer<ScriptedSpeech>> {
        let pacer = SpeechPacer::new(ScriptedSpeech::new(), None);
        let mut scheduler = Scheduler::new(pacer, 1.0).unwrap();
        scheduler.load(tokenize_sentences(text));
        scheduler
    }

    fn deliver(scheduler: &mut Scheduler<SpeechPacer<ScriptedSpeech>>) -> bool {
        match scheduler.pacer_mut().poll() {
            Some(SpeechEvent::Finished(ticket)) => scheduler.complete(ticket),
            Some(SpeechEvent::Failed { ticket, .. }) => scheduler.fail(ticket),
            None => false,
        }
    }

    #[test]
    fn test_speech_reads_every_sentence() {
        let mut scheduler = speech_scheduler("One. Two! Three?");
        scheduler.play();
        loop {
            scheduler.pacer_mut().port_mut().finish_current();
            if !deliver(&mut scheduler) {
                break;
            }
        }

        let spoken: Vec<_> = scheduler
            .pacer()
            .port()
            .spoken
            .iter()
            .map(|u| u.text.clone())
            .collect();
        assert_eq!(spoken, vec!["One.", "Two!", "Three?"]);
        assert!(scheduler.state().is_finished());
        assert!(!scheduler.state().is_playing());
    }

    #[test]
    fn test_speech_error_pauses_without_advancing() {
        let mut scheduler = speech_scheduler("One. Two.");
        scheduler.play();
        scheduler.pacer_mut().port_mut().fail_current("engine crashed");
        assert!(deliver(&mut scheduler));

        assert_eq!(scheduler.state().index(), 0);
        assert!(!scheduler.state().is_playing());
        assert_eq!(scheduler.pacer().port().spoken.len(), 1);
    }

    #[test]
    fn test_speech_late_finish_after_jump_is_ignored() {
        let mut scheduler = speech_scheduler("One. Two. Three.");
        scheduler.play();
        let stale = scheduler.pacer().port().current.unwrap();

        scheduler.jump_to(2);
        assert!(!scheduler.complete(stale));
        assert_eq!(scheduler.state().index(), 2);
        assert!(scheduler.state().is_playing());
        assert_eq!(scheduler.pacer().port().spoken.last().unwrap().text, "Three.");
    }

    #[test]
    fn test_speech_rate_applies_to_next_utterance() {
        let mut scheduler = speech_scheduler("One. Two.");
        scheduler.play();
        scheduler.set_rate(1.5).unwrap();
        assert_eq!(scheduler.pacer().port().spoken.len(), 1);
        assert_eq!(scheduler.pacer().port().spoken[0].rate, 1.0);

        scheduler.pacer_mut().port_mut().finish_current();
        deliver(&mut scheduler);
        assert_eq!(scheduler.pacer().port().spoken[1].rate, 1.5);
    }

    #[test]
    fn test_speech_pause_cancels_utterance() {
        let mut scheduler = speech_scheduler("One. Two.");
        scheduler.play();
        scheduler.pause();
        assert!(scheduler.pacer().port().current.is_none());
        assert!(scheduler.pacer().port().cancels >= 1);
    }
}
