use std::fmt;

/// Which outbound send failed while handling an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryStage {
    /// Copying the content into the target destination.
    Forward,
    /// Sending the forward confirmation back to the sender.
    Confirm,
    /// Sending a canned reply (commands, lookup refusal).
    Reply,
}

impl fmt::Display for DeliveryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStage::Forward => write!(f, "forward"),
            DeliveryStage::Confirm => write!(f, "confirm"),
            DeliveryStage::Reply => write!(f, "reply"),
        }
    }
}

/// Core error type for the relay bot.
///
/// Adapter crates map their specific errors into this type so the relay
/// pipeline can tell fatal startup problems from per-event failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("delivery failed at {stage}: {reason}")]
    Delivery { stage: DeliveryStage, reason: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn delivery(stage: DeliveryStage, reason: impl Into<String>) -> Self {
        Error::Delivery {
            stage,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
