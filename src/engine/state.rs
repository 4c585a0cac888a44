//! AR session/placement state machine.
//!
//! Transition table:
//!
//! | from                 | event                     | to                   |
//! |----------------------|---------------------------|----------------------|
//! | Probing              | ProbeResolved(true)       | Inactive             |
//! | Probing              | ProbeResolved(false)      | Unsupported          |
//! | Inactive             | SessionStarted(s)         | Active(s, NotPlaced) |
//! | Inactive             | SessionFailed             | Inactive             |
//! | Active(s, NotPlaced) | Placed(n)                 | Active(s, Placed(n)) |
//! | Active(s, _)         | SessionEnded(s)           | Inactive             |
//!
//! Anything else is rejected and leaves the state unchanged.

use crate::engine::graphics::NodeKey;
use crate::engine::xr::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    NotPlaced,
    Placed(NodeKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArState {
    /// Mounted, capability probe not resolved yet.
    #[default]
    Probing,
    Unsupported,
    Inactive,
    Active {
        session: SessionId,
        placement: Placement,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArEvent {
    ProbeResolved { supported: bool },
    SessionStarted(SessionId),
    SessionFailed,
    Placed(NodeKey),
    SessionEnded(SessionId),
}

impl ArState {
    /// Next state for `event`, or `None` when the table has no such edge.
    pub fn next(&self, event: ArEvent) -> Option<ArState> {
        use ArState::*;

        match (*self, event) {
            (Probing, ArEvent::ProbeResolved { supported: true }) => Some(Inactive),
            (Probing, ArEvent::ProbeResolved { supported: false }) => Some(Unsupported),
            (Inactive, ArEvent::SessionStarted(session)) => Some(Active {
                session,
                placement: Placement::NotPlaced,
            }),
            (Inactive, ArEvent::SessionFailed) => Some(Inactive),
            (
                Active {
                    session,
                    placement: Placement::NotPlaced,
                },
                ArEvent::Placed(node),
            ) => Some(Active {
                session,
                placement: Placement::Placed(node),
            }),
            (Active { session, .. }, ArEvent::SessionEnded(ended)) if session == ended => {
                Some(Inactive)
            }
            _ => None,
        }
    }

    /// Apply `event` in place. Returns whether an edge was taken.
    pub fn apply(&mut self, event: ArEvent) -> bool {
        match self.next(event) {
            Some(next) => {
                log::debug!("state {:?} --{:?}--> {:?}", self, event, next);
                *self = next;
                true
            }
            None => {
                log::debug!("state {:?} ignores {:?}", self, event);
                false
            }
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, ArState::Inactive | ArState::Active { .. })
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ArState::Active { .. })
    }

    pub fn session(&self) -> Option<SessionId> {
        match self {
            ArState::Active { session, .. } => Some(*session),
            _ => None,
        }
    }

    pub fn placed_node(&self) -> Option<NodeKey> {
        match self {
            ArState::Active {
                placement: Placement::Placed(node),
                ..
            } => Some(*node),
            _ => None,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.placed_node().is_some()
    }

    pub fn can_start(&self) -> bool {
        matches!(self, ArState::Inactive)
    }

    pub fn can_place(&self) -> bool {
        matches!(
            self,
            ArState::Active {
                placement: Placement::NotPlaced,
                ..
            }
        )
    }
}
