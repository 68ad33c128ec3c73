use std::collections::VecDeque;

use super::{SpeechEvent, SpeechPort, Utterance};
use crate::engine::scheduler::Ticket;

#[derive(Debug, Clone, PartialEq)]
pub struct SpokenUtterance {
    pub ticket: Ticket,
    pub text: String,
    pub rate: f64,
    pub voice: Option<String>,
}

/// Speech port driven by the test: utterances finish or fail on request.
#[derive(Debug, Default)]
pub struct ScriptedSpeech {
    pub spoken: Vec<SpokenUtterance>,
    pub current: Option<Ticket>,
    pub cancels: usize,
    events: VecDeque<SpeechEvent>,
}

impl ScriptedSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish_current(&mut self) {
        if let Some(ticket) = self.current.take() {
            self.events.push_back(SpeechEvent::Finished(ticket));
        }
    }

    pub fn fail_current(&mut self, reason: &str) {
        if let Some(ticket) = self.current.take() {
            self.events.push_back(SpeechEvent::Failed {
                ticket,
                reason: reason.to_string(),
            });
        }
    }
}

impl SpeechPort for ScriptedSpeech {
    fn speak(&mut self, utterance: Utterance<'_>) {
        self.current = Some(utterance.ticket);
        self.spoken.push(SpokenUtterance {
            ticket: utterance.ticket,
            text: utterance.text.to_string(),
            rate: utterance.rate,
            voice: utterance.voice.map(str::to_string),
        });
    }

    fn cancel(&mut self) {
        self.cancels += 1;
        self.current = None;
        self.events.clear();
    }

    fn poll(&mut self) -> Option<SpeechEvent> {
        self.events.pop_front()
    }
}
