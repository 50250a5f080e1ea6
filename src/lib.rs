//! Пул OS-потоков фиксированного размера с handle на результат каждой задачи
//!
//! # Features
//! - Общая FIFO очередь: задачи забираются строго в порядке постановки
//! - `JoinHandle` с блокирующим `join`/`get`, опросом `try_get` и `.await`
//! - Паники задач перехватываются и возвращаются через handle
//! - Graceful shutdown: всё поставленное до остановки будет выполнено
//! - Метрики пула
//!
//! ```no_run
//! use worker_pool::ThreadPool;
//!
//! let pool = ThreadPool::new(4)?;
//! let handles: Vec<_> = (0..8)
//!     .map(|i| pool.submit(move || i * i))
//!     .collect::<Result<_, _>>()?;
//!
//! for handle in handles {
//!     println!("{}", handle.join()?);
//! }
//! pool.shutdown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod errors;
pub mod handle;
pub mod model;
pub mod pool;
pub mod queue;
pub mod result;
pub mod task;

pub use errors::{BuildError, SpawnError};
pub use handle::JoinHandle;
pub use model::PoolMetrics;
pub use pool::{Config, Spawner, ThreadPool};
pub use result::SpawnResult;
