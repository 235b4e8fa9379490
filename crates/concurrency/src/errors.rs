use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("aggregation needs at least one partition")]
    NoPartitions,

    #[error("failed to spawn aggregation worker: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("workers exited after delivering {received} of {expected} partial sums")]
    WorkerLost { received: usize, expected: usize },

    #[error("budget elapsed after receiving {received} of {expected} partial sums")]
    TimedOut { received: usize, expected: usize },
}

pub type AggregateResult<T> = std::result::Result<T, AggregateError>;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("failed to spawn generator producer: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("generator producer panicked")]
    ProducerPanicked,
}

pub type GeneratorResult<T> = std::result::Result<T, GeneratorError>;
