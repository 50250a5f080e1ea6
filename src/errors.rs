use std::io;
use thiserror::Error;


/// Ошибки, которые submitter видит через `JoinHandle` или при постановке задачи
#[derive(Error, Debug, PartialEq, PartialOrd, Eq, Ord, Clone)]
pub enum SpawnError {
    #[error("task panicked: {0}")]
    Panic(String),
    #[error("task was dropped before producing a result")]
    ChannelClosed,
    #[error("thread pool is shut down")]
    PoolShutdown,
    #[error("timed out waiting for task result")]
    Timeout,
}

/// Ошибки создания пула
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("thread pool needs at least one worker thread")]
    NoThreads,
    #[error("failed to spawn worker thread {index}: {source}")]
    ThreadSpawn {
        index: usize,
        #[source]
        source: io::Error,
    },
}
