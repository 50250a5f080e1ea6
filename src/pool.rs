use super::{
    errors::{BuildError, SpawnError},
    result::SpawnResult,
    handle::JoinHandle,
    model::{
        Counters,
        PoolMetrics,
    },
    queue::{Dequeued, TaskQueue},
    task::{self, Task},
};
use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread,
};
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};


/// Конфигурация пула потоков
#[derive(Debug, Clone)]
pub struct Config {
    pub num_threads: usize,
    pub thread_name_prefix: String,
    pub stack_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            thread_name_prefix: "worker-pool".to_owned(),
            stack_size: None,
        }
    }
}

impl Config {
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads,
            ..Default::default()
        }
    }

    pub fn cpu_bound() -> Self {
        Self::with_threads(num_cpus::get())
    }

    /// 2 × число ядер
    pub fn io_bound() -> Self {
        Self::with_threads(num_cpus::get() * 2)
    }

    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }
}


struct Shared {
    queue: TaskQueue,
    counters: Arc<Counters>,
    num_threads: usize,
}

impl Shared {
    fn submit<F, T>(&self, f: F) -> Result<JoinHandle<T>, SpawnError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel::<SpawnResult<T>>();
        let counters = self.counters.clone();

        let task = Task::new(move || {
            counters.started();
            let result = panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
                let message = task::panic_message(payload.as_ref());
                warn!(panic = %message, "task panicked");
                SpawnError::Panic(message)
            });
            // счётчики обновляются до send: получивший результат видит актуальные метрики
            counters.finished(result.is_ok());
            // submitter мог уже выбросить handle
            let _ = tx.send(result);
        });

        self.counters.submitted();
        if let Err(e) = self.queue.enqueue(task) {
            self.counters.rejected();
            return Err(e);
        }

        Ok(JoinHandle::new(rx))
    }

    fn metrics(&self) -> PoolMetrics {
        self.counters.snapshot(self.num_threads, self.queue.len())
    }
}


/// Пул с фиксированным числом OS-потоков и общей FIFO очередью.
///
/// Задачи забираются воркерами строго в порядке постановки. При `shutdown` или
/// drop пул перестаёт принимать задачи, дожидается выполнения всего, что уже
/// было в очереди, и джойнит все потоки.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl ThreadPool {
    pub fn new(num_threads: usize) -> Result<Self, BuildError> {
        Self::with_config(Config::with_threads(num_threads))
    }

    pub fn with_config(config: Config) -> Result<Self, BuildError> {
        if config.num_threads == 0 {
            return Err(BuildError::NoThreads);
        }

        let shared = Arc::new(Shared {
            queue: TaskQueue::new(),
            counters: Arc::new(Counters::default()),
            num_threads: config.num_threads,
        });

        let mut workers = Vec::with_capacity(config.num_threads);
        for index in 0..config.num_threads {
            let mut builder = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name_prefix, index));
            if let Some(bytes) = config.stack_size {
                builder = builder.stack_size(bytes);
            }

            let worker_shared = shared.clone();
            match builder.spawn(move || worker_loop(index, &worker_shared.queue)) {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    // не оставляем полуживой пул
                    shared.queue.request_shutdown();
                    join_workers(&mut workers);
                    return Err(BuildError::ThreadSpawn { index, source });
                }
            }
        }

        debug!(num_threads = config.num_threads, "thread pool started");

        Ok(Self { shared, workers })
    }

    /// Ставит задачу в очередь и сразу возвращает handle на её результат
    pub fn submit<F, T>(&self, f: F) -> Result<JoinHandle<T>, SpawnError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.shared.submit(f)
    }

    /// `submit` с явными аргументами: `args` передаются в `f` при выполнении
    pub fn submit_with<F, A, T>(&self, f: F, args: A) -> Result<JoinHandle<T>, SpawnError>
    where
        F: FnOnce(A) -> T + Send + 'static,
        A: Send + 'static,
        T: Send + 'static,
    {
        self.shared.submit(move || f(args))
    }

    /// Handle только для постановки задач, его можно передавать внутрь задач
    pub fn spawner(&self) -> Spawner {
        Spawner {
            shared: self.shared.clone(),
        }
    }

    #[inline]
    pub fn num_threads(&self) -> usize {
        self.shared.num_threads
    }

    #[inline]
    pub fn metrics(&self) -> PoolMetrics {
        self.shared.metrics()
    }

    /// Выполняет всё, что уже в очереди, и останавливает потоки
    pub fn shutdown(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.shared.queue.request_shutdown();
        join_workers(&mut self.workers);
        debug!("thread pool shut down");
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("num_threads", &self.shared.num_threads)
            .field("queued_tasks", &self.shared.queue.len())
            .finish()
    }
}


/// Клонируемый handle для постановки задач в [`ThreadPool`].
///
/// Не держит потоки: после остановки пула `submit` возвращает
/// [`SpawnError::PoolShutdown`].
#[derive(Clone)]
pub struct Spawner {
    shared: Arc<Shared>,
}

impl Spawner {
    pub fn submit<F, T>(&self, f: F) -> Result<JoinHandle<T>, SpawnError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.shared.submit(f)
    }

    pub fn submit_with<F, A, T>(&self, f: F, args: A) -> Result<JoinHandle<T>, SpawnError>
    where
        F: FnOnce(A) -> T + Send + 'static,
        A: Send + 'static,
        T: Send + 'static,
    {
        self.shared.submit(move || f(args))
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.shared.queue.is_shutdown()
    }

    #[inline]
    pub fn num_threads(&self) -> usize {
        self.shared.num_threads
    }

    #[inline]
    pub fn metrics(&self) -> PoolMetrics {
        self.shared.metrics()
    }
}

impl fmt::Debug for Spawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}


fn worker_loop(index: usize, queue: &TaskQueue) {
    debug!(worker = index, "worker started");

    let mut executed = 0_usize;
    while let Dequeued::Task(task) = queue.dequeue_blocking() {
        trace!(worker = index, "task picked up");
        task.run();
        executed += 1;
    }

    debug!(worker = index, executed, "worker stopped");
}

fn join_workers(workers: &mut Vec<thread::JoinHandle<()>>) {
    let current = thread::current().id();
    for handle in workers.drain(..) {
        // пул дропнули изнутри собственной задачи: себя не джойним
        if handle.thread().id() == current {
            continue;
        }
        if handle.join().is_err() {
            warn!("worker thread exited with a panic");
        }
    }
}
