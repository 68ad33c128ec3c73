use std::collections::VecDeque;
use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

use super::{SpeechError, SpeechEvent, SpeechPort, Utterance};
use crate::engine::config::SpeechConfig;
use crate::engine::scheduler::Ticket;

/// Speaks each utterance by running an external program (`espeak-ng`, `say`,
/// ...) with the sentence after a `--` separator, so text starting with `-`
/// is never read as a flag. Exit status 0 is a finished utterance; anything
/// else is a failure.
pub struct CommandSpeech {
    config: SpeechConfig,
    current: Option<(Ticket, Child)>,
    pending: VecDeque<SpeechEvent>,
}

impl CommandSpeech {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            config,
            current: None,
            pending: VecDeque::new(),
        }
    }

    /// Engine words per minute for a rate multiplier.
    pub fn engine_wpm(&self, rate: f64) -> u32 {
        (self.config.base_wpm as f64 * rate).round().max(1.0) as u32
    }

    fn command(&self, utterance: &Utterance<'_>) -> Command {
        let mut command = Command::new(&self.config.program);
        command
            .arg(&self.config.rate_flag)
            .arg(self.engine_wpm(utterance.rate).to_string());

        if let Some(voice) = utterance.voice {
            command.arg(&self.config.voice_flag).arg(voice);
        }

        command
            .arg("--")
            .arg(utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }

    fn fail(&mut self, ticket: Ticket, error: SpeechError) {
        warn!(%error, "speech failed");
        self.pending.push_back(SpeechEvent::Failed {
            ticket,
            reason: error.to_string(),
        });
    }
}

impl SpeechPort for CommandSpeech {
    fn speak(&mut self, utterance: Utterance<'_>) {
        self.cancel();

        match self.command(&utterance).spawn() {
            Ok(child) => {
                debug!(pid = child.id(), chars = utterance.text.len(), "speaking");
                self.current = Some((utterance.ticket, child));
            }
            Err(source) => {
                let error = SpeechError::Spawn {
                    program: self.config.program.clone(),
                    source,
                };
                self.fail(utterance.ticket, error);
            }
        }
    }

    fn cancel(&mut self) {
        self.pending.clear();
        if let Some((_, mut child)) = self.current.take() {
            // The child may already have exited; both calls are best effort.
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn poll(&mut self) -> Option<SpeechEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let (ticket, child) = self.current.as_mut()?;
        let ticket = *ticket;

        match child.try_wait() {
            Ok(None) => None,
            Ok(Some(status)) => {
                self.current = None;
                if status.success() {
                    Some(SpeechEvent::Finished(ticket))
                } else {
                    let error = SpeechError::Exit {
                        program: self.config.program.clone(),
                        status: status.to_string(),
                    };
                    self.fail(ticket, error);
                    self.pending.pop_front()
                }
            }
            Err(err) => {
                self.current = None;
                self.fail(ticket, SpeechError::Wait(err));
                self.pending.pop_front()
            }
        }
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        self.cancel();
    }
}
