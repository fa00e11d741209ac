//! Allied notifications emitted by ships for the host's communication hub.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::MessageKind;
use crate::types::{AgentId, TargetId};

/// Extra data carried by a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MessagePayload {
    #[default]
    None,
    /// The target the sender is reporting or engaging.
    Target { target: TargetId },
    /// Escort request while fleeing from `threat`.
    Escort { threat: Option<TargetId> },
    /// Request to strike `target` together with `allies` nearby ships.
    CoordinatedStrike { target: TargetId, allies: u32 },
}

/// A fire-and-forget message from one ship to its allies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub sender: AgentId,
    /// Sender position when the message was issued.
    pub position: DVec3,
    pub payload: MessagePayload,
}

impl Message {
    pub fn new(kind: MessageKind, sender: AgentId, position: DVec3, payload: MessagePayload) -> Self {
        Self {
            kind,
            sender,
            position,
            payload,
        }
    }
}

/// Ordered buffer of messages produced during a tick.
/// Drained once per tick into the communication hub.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    messages: Vec<Message>,
}

impl Outbox {
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Remove and return all queued messages in emission order.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }
}
