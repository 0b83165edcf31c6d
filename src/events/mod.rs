//! Queue lifecycle events.
//!
//! Every submission outcome is published to an [`EventSink`] so
//! transports can push acknowledgements and rejections to clients
//! without polling the queue. The engine itself never reads these back;
//! they are strictly outbound.

use serde::{Deserialize, Serialize};

use crate::core::player::PlayerId;
use crate::core::request::ActionKind;
use crate::error::RejectReason;
use crate::queue::ActionId;
use crate::validation::ValidationResult;

/// Something the queue wants the outside world to know.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum EngineEvent {
    /// An action entered the queue (or executed immediately).
    ActionSubmitted {
        action: ActionId,
        player: PlayerId,
        kind: ActionKind,
    },
    /// A pending action was withdrawn before resolution.
    ActionCancelled { action: ActionId, player: PlayerId },
    /// An action failed validation or execution.
    ActionRejected {
        action: ActionId,
        player: PlayerId,
        reason: RejectReason,
    },
    /// A dry-run validation finished; carries the full scored result.
    ActionValidated {
        action: ActionId,
        player: PlayerId,
        result: ValidationResult,
    },
    /// A round finished resolving.
    RoundResolved {
        round: u32,
        processed: usize,
        rejected: usize,
    },
}

/// Receiver for engine events.
///
/// Implementations must not call back into the engine; events are
/// published mid-mutation.
pub trait EventSink {
    fn publish(&mut self, event: EngineEvent);
}

/// Default sink: an in-memory buffer the transport drains after each
/// engine call.
///
/// Backed by an `im` vector so snapshotting the pending event list for
/// a reconnecting client is O(1).
#[derive(Clone, Debug, Default)]
pub struct EventBuffer {
    events: im::Vector<EngineEvent>,
}

impl EventBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of undrained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate events without draining.
    pub fn iter(&self) -> impl Iterator<Item = &EngineEvent> {
        self.events.iter()
    }

    /// Take every buffered event, oldest first.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        let drained: Vec<_> = self.events.iter().cloned().collect();
        self.events.clear();
        drained
    }
}

impl EventSink for EventBuffer {
    fn publish(&mut self, event: EngineEvent) {
        self.events.push_back(event);
    }
}

/// Sink that drops everything. For simulations that only care about
/// final state.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&mut self, _event: EngineEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_preserves_order() {
        let mut buffer = EventBuffer::new();
        buffer.publish(EngineEvent::ActionSubmitted {
            action: ActionId::new(1),
            player: PlayerId::new(0),
            kind: ActionKind::Defend,
        });
        buffer.publish(EngineEvent::ActionCancelled {
            action: ActionId::new(1),
            player: PlayerId::new(0),
        });

        assert_eq!(buffer.len(), 2);
        let drained = buffer.drain();
        assert!(matches!(drained[0], EngineEvent::ActionSubmitted { .. }));
        assert!(matches!(drained[1], EngineEvent::ActionCancelled { .. }));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = EngineEvent::RoundResolved {
            round: 3,
            processed: 5,
            rejected: 1,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"round_resolved""#));
    }
}
