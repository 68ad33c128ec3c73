//! Advance triggers for a [`Scheduler`](crate::engine::scheduler::Scheduler).
//!
//! A pacer is armed with one ticket at a time. It never calls back into the
//! scheduler; the host loop collects due tickets from it and hands them to
//! `Scheduler::complete` / `Scheduler::fail`.

use std::time::{Duration, Instant};

use crate::engine::config::TimingConfig;
use crate::engine::scheduler::Ticket;
use crate::reading::timing::word_delay;
use crate::speech::{SpeechEvent, SpeechPort, Utterance};

pub trait Pacer {
    /// Starts presenting `token`. Replaces anything armed before.
    fn arm(&mut self, ticket: Ticket, token: &str, rate: f64);

    /// Drops the armed ticket, if any. Must be safe to call when idle.
    fn disarm(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    ticket: Ticket,
    delay: Duration,
    deadline: Instant,
}

/// Word mode: a single-shot deadline computed from the token's delay.
#[derive(Debug, Clone)]
pub struct DeadlinePacer {
    config: TimingConfig,
    pending: Option<Pending>,
}

impl DeadlinePacer {
    pub fn new(config: TimingConfig) -> Self {
        Self {
            config,
            pending: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Delay computed for the armed token.
    pub fn pending_delay(&self) -> Option<Duration> {
        self.pending.map(|p| p.delay)
    }

    /// Hands out the armed ticket once its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<Ticket> {
        match self.pending {
            Some(pending) if pending.deadline <= now => {
                self.pending = None;
                Some(pending.ticket)
            }
            _ => None,
        }
    }
}

impl Pacer for DeadlinePacer {
    fn arm(&mut self, ticket: Ticket, token: &str, rate: f64) {
        let delay = word_delay(token, rate, &self.config);
        self.pending = Some(Pending {
            ticket,
            delay,
            deadline: Instant::now() + delay,
        });
    }

    fn disarm(&mut self) {
        self.pending = None;
    }
}

/// Sentence mode: each token is spoken; the engine reports when it is done.
pub struct SpeechPacer<S: SpeechPort> {
    port: S,
    voice: Option<String>,
}

impl<S: SpeechPort> SpeechPacer<S> {
    pub fn new(port: S, voice: Option<String>) -> Self {
        Self { port, voice }
    }

    pub fn poll(&mut self) -> Option<SpeechEvent> {
        self.port.poll()
    }

    pub fn port(&self) -> &S {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut S {
        &mut self.port
    }
}

impl<S: SpeechPort> Pacer for SpeechPacer<S> {
    fn arm(&mut self, ticket: Ticket, token: &str, rate: f64) {
        self.port.speak(Utterance {
            ticket,
            text: token,
            rate,
            voice: self.voice.as_deref(),
        });
    }

    fn disarm(&mut self) {
        self.port.cancel();
    }
}
