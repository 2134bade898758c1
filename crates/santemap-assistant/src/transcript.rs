//! Conversation transcript and its streaming state machine.
//!
//! One transcript belongs to one conversation session and is mutated from
//! a single task. At most one assistant turn is live at a time; its
//! content is replaced in place by each update and frozen once the turn
//! reaches `Done` or `Errored`.

use santemap_schema::{ChatMessage, ChatRole};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatPhase {
    Idle,
    Streaming,
    Done,
    Errored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    /// A new send while a previous stream is open is rejected outright.
    #[error("a turn is already streaming")]
    TurnInProgress,
}

#[derive(Debug)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    phase: ChatPhase,
    live_assistant: bool,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            phase: ChatPhase::Idle,
            live_assistant: false,
        }
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_assistant(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Assistant)
            .map(|m| m.content.as_str())
    }

    /// Record the user's message and open a streaming turn. Fails while
    /// another turn is streaming; the transcript is left untouched.
    pub fn begin_turn(&mut self, user_text: impl Into<String>) -> Result<(), TranscriptError> {
        if self.phase == ChatPhase::Streaming {
            return Err(TranscriptError::TurnInProgress);
        }
        self.messages.push(ChatMessage::user(user_text));
        self.phase = ChatPhase::Streaming;
        self.live_assistant = false;
        Ok(())
    }

    /// Replace the live assistant entry with `content`, creating it on
    /// the first delta. Ignored outside a streaming turn.
    pub fn apply_update(&mut self, content: &str) {
        if self.phase != ChatPhase::Streaming {
            return;
        }
        if self.live_assistant {
            if let Some(last) = self.messages.last_mut() {
                last.content = content.to_string();
                return;
            }
        }
        self.messages.push(ChatMessage::assistant(content));
        self.live_assistant = true;
    }

    /// Freeze the live turn.
    pub fn complete(&mut self) {
        if self.phase == ChatPhase::Streaming {
            self.phase = ChatPhase::Done;
            self.live_assistant = false;
        }
    }

    /// Abort the turn: append exactly one assistant entry carrying the
    /// user-facing error text.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(message));
        self.phase = ChatPhase::Errored;
        self.live_assistant = false;
    }

    /// Drop the whole conversation.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.phase = ChatPhase::Idle;
        self.live_assistant = false;
    }
}
