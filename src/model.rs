use std::sync::atomic::{AtomicUsize, Ordering};


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMetrics {
    pub num_threads: usize,
    pub active_tasks: usize,
    pub idle_workers: usize,
    pub queued_tasks: usize,
    pub total_submitted: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
}

impl PoolMetrics {
    pub fn utilization(&self) -> f64 {
        if self.num_threads == 0 {
            return 0.0;
        }
        self.active_tasks as f64 / self.num_threads as f64
    }

    pub fn queue_pressure(&self) -> f64 {
        if self.num_threads == 0 {
            return 0.0;
        }
        self.queued_tasks as f64 / self.num_threads as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.completed_tasks + self.failed_tasks;
        if total == 0 {
            return 1.0;
        }
        self.completed_tasks as f64 / total as f64
    }

    /// Задачи, которые уже приняты, но ещё не закончились
    pub fn pending(&self) -> usize {
        self.total_submitted
            .saturating_sub(self.completed_tasks + self.failed_tasks)
    }
}


/// Счётчики, которые обновляют submitter'ы и воркеры
#[derive(Debug, Default)]
pub(crate) struct Counters {
    active: AtomicUsize,
    total_submitted: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl Counters {
    /// Вызывается до постановки в очередь, чтобы задачу нельзя было
    /// завершить раньше, чем она учтена
    #[inline]
    pub(crate) fn submitted(&self) {
        self.total_submitted.fetch_add(1, Ordering::AcqRel);
    }

    /// Откат `submitted`, если очередь отказала
    #[inline]
    pub(crate) fn rejected(&self) {
        self.total_submitted.fetch_sub(1, Ordering::AcqRel);
    }

    #[inline]
    pub(crate) fn started(&self) {
        self.active.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn finished(&self, ok: bool) {
        if ok {
            self.completed.fetch_add(1, Ordering::Release);
        } else {
            self.failed.fetch_add(1, Ordering::Release);
        }
        self.active.fetch_sub(1, Ordering::Release);
    }

    pub(crate) fn snapshot(&self, num_threads: usize, queued_tasks: usize) -> PoolMetrics {
        let active_tasks = self.active.load(Ordering::Acquire);
        // завершённые читаются раньше total: total >= completed + failed
        let completed_tasks = self.completed.load(Ordering::Acquire);
        let failed_tasks = self.failed.load(Ordering::Acquire);
        let total_submitted = self.total_submitted.load(Ordering::Acquire);
        PoolMetrics {
            num_threads,
            active_tasks,
            idle_workers: num_threads.saturating_sub(active_tasks),
            queued_tasks,
            total_submitted,
            completed_tasks,
            failed_tasks,
        }
    }
}
