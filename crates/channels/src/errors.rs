use thiserror::Error;

pub type Result<T> = anyhow::Result<T, ChannelError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Channel has been closed")]
    Closed,

    #[error("Channel buffer is full")]
    Full,

    #[error("Channel sent nothing, possibly closed")]
    ReceivedNoData,

    #[error("Channel delivered nothing within the allowed time")]
    TimedOut,
}

impl ChannelError {
    /// Returns true when the error means no message will ever
    /// arrive again on the channel.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
