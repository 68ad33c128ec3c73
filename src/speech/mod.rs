//! Speech engine port for sentence mode.
//!
//! The scheduler asks the port to speak one utterance at a time. The port
//! reports completion or failure later through [`SpeechPort::poll`]; it never
//! calls back into the scheduler.

pub mod command;
#[cfg(test)]
pub(crate) mod testing;

pub use command::CommandSpeech;

use thiserror::Error;

use crate::engine::scheduler::Ticket;

/// One sentence to speak. Rate and voice are passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Utterance<'a> {
    pub ticket: Ticket,
    pub text: &'a str,
    pub rate: f64,
    pub voice: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Finished(Ticket),
    Failed { ticket: Ticket, reason: String },
}

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Failed to start speech program {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Speech program {program} exited with {status}")]
    Exit { program: String, status: String },

    #[error("Failed to wait for speech program: {0}")]
    Wait(#[from] std::io::Error),
}

pub trait SpeechPort {
    /// Starts speaking, replacing any utterance in flight.
    fn speak(&mut self, utterance: Utterance<'_>);

    /// Stops the utterance in flight. Its completion must never be reported.
    fn cancel(&mut self);

    /// Next completion or failure, if one is ready.
    fn poll(&mut self) -> Option<SpeechEvent>;
}
