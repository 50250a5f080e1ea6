use super::{
    errors::SpawnError,
    task::Task,
};
use std::sync::{PoisonError, RwLock};
use crossbeam::channel::{self, Receiver, Sender};


/// Что воркер получил из очереди
#[derive(Debug)]
pub enum Dequeued {
    Task(Task),
    Shutdown,
}

/// FIFO очередь задач, общая для всех воркеров.
///
/// Sender живёт под локом: `request_shutdown` забирает его и дропает, после
/// чего канал отдаёт оставшиеся задачи и только потом сообщает о разрыве.
/// Так всё, что было поставлено до shutdown, гарантированно выполняется.
#[derive(Debug)]
pub struct TaskQueue {
    sender: RwLock<Option<Sender<Task>>>,
    receiver: Receiver<Task>,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Self {
            sender: RwLock::new(Some(tx)),
            receiver: rx,
        }
    }

    /// Ставит задачу в хвост и будит одного ожидающего воркера
    pub fn enqueue(&self, task: Task) -> Result<(), SpawnError> {
        let guard = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            // receiver живёт в self, поэтому send не может упасть
            Some(tx) => tx.send(task).map_err(|_| SpawnError::PoolShutdown),
            None => Err(SpawnError::PoolShutdown),
        }
    }

    /// Блокируется, пока не появится задача или не будет запрошен shutdown
    /// при пустой очереди.
    pub fn dequeue_blocking(&self) -> Dequeued {
        match self.receiver.recv() {
            Ok(task) => Dequeued::Task(task),
            Err(_) => Dequeued::Shutdown,
        }
    }

    /// Идемпотентно
    pub fn request_shutdown(&self) {
        let sender = self
            .sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{Arc, Mutex},
        thread,
        time::Duration,
    };

    fn recording(log: &Arc<Mutex<Vec<usize>>>, i: usize) -> Task {
        let log = log.clone();
        Task::new(move || log.lock().unwrap().push(i))
    }

    #[test]
    fn dequeue_is_fifo() {
        let queue = TaskQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            queue.enqueue(recording(&log, i)).unwrap();
        }
        assert_eq!(queue.len(), 10);

        for _ in 0..10 {
            match queue.dequeue_blocking() {
                Dequeued::Task(task) => task.run(),
                Dequeued::Shutdown => panic!("queue reported shutdown too early"),
            }
        }

        assert!(queue.is_empty());
        assert_eq!(*log.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn shutdown_drains_before_signalling() {
        let queue = TaskQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        queue.enqueue(recording(&log, 1)).unwrap();
        queue.enqueue(recording(&log, 2)).unwrap();
        queue.request_shutdown();
        assert!(queue.is_shutdown());

        let mut ran = 0;
        while let Dequeued::Task(task) = queue.dequeue_blocking() {
            task.run();
            ran += 1;
        }

        assert_eq!(ran, 2);
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
        // повторный вызов тоже видит shutdown, а не зависает
        assert!(matches!(queue.dequeue_blocking(), Dequeued::Shutdown));
    }

    #[test]
    fn enqueue_after_shutdown_is_rejected() {
        let queue = TaskQueue::new();
        queue.request_shutdown();
        queue.request_shutdown();

        let err = queue.enqueue(Task::new(|| {})).unwrap_err();
        assert_eq!(err, SpawnError::PoolShutdown);
        assert!(queue.is_empty());
    }

    #[test]
    fn shutdown_wakes_blocked_workers() {
        let queue = Arc::new(TaskQueue::new());

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let q = queue.clone();
                thread::spawn(move || matches!(q.dequeue_blocking(), Dequeued::Shutdown))
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        queue.request_shutdown();

        for w in waiters {
            assert!(w.join().unwrap());
        }
    }
}
