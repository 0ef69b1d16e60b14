use thiserror::Error;

/// Errors raised while reading the owning event's data.
///
/// Rule text itself never produces an error; see [`crate::RecurrenceRule::deserialize`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid event start value: {0:?}")]
    InvalidStart(String),

    #[error("unknown timezone: {0:?}")]
    UnknownTimezone(String),
}

pub type Result<T> = std::result::Result<T, Error>;
