use std::sync::Arc;

use crate::{admin::RelayState, classify::parse_command, domain::InboundEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    NonPrivate,
    RelayDisabled,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NonPrivate => "non-private",
            RejectReason::RelayDisabled => "relay-disabled",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Proceed,
    Reject(RejectReason),
}

/// Decides whether an event is processed at all. Consulted before any other work.
#[derive(Clone, Debug)]
pub struct Gate {
    state: Arc<RelayState>,
}

impl Gate {
    pub fn new(state: Arc<RelayState>) -> Self {
        Self { state }
    }

    pub fn admit(&self, event: &InboundEvent) -> Admission {
        if !event.is_private() {
            return Admission::Reject(RejectReason::NonPrivate);
        }

        if !self.state.is_enabled() {
            // enable/disable must still reach the admin controller, otherwise
            // the relay could never be switched back on.
            let admin_control = parse_command(&event.text).is_some_and(|c| c.is_admin_control());
            if !admin_control {
                return Admission::Reject(RejectReason::RelayDisabled);
            }
        }

        Admission::Proceed
    }
}
