use std::{
    any::Any,
    fmt,
};


/// Type-erased единица работы: вызывается ровно один раз, результат уходит
/// через парный `JoinHandle`, созданный при постановке задачи.
pub struct Task {
    f: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    #[inline]
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self { f: Box::new(f) }
    }

    #[inline]
    pub fn run(self) {
        (self.f)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

/// Достаёт текст из payload паники (`panic!("...")` кладёт `&str` или `String`)
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc, Arc,
    };

    #[test]
    fn run_invokes_closure_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let task = Task::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        task.run();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn task_owns_move_only_state() {
        // Замыкание владеет захваченным состоянием по значению
        let (tx, rx) = mpsc::channel::<String>();
        let owned = String::from("moved in");
        let task = Task::new(move || {
            tx.send(owned).unwrap();
        });
        task.run();
        assert_eq!(rx.recv().unwrap(), "moved in");
    }

    #[test]
    fn panic_message_handles_common_payloads() {
        let err = std::panic::catch_unwind(|| panic!("static text")).unwrap_err();
        assert_eq!(panic_message(err.as_ref()), "static text");

        let err = std::panic::catch_unwind(|| panic!("formatted {}", 7)).unwrap_err();
        assert_eq!(panic_message(err.as_ref()), "formatted 7");

        let err = std::panic::catch_unwind(|| std::panic::panic_any(42_u32)).unwrap_err();
        assert_eq!(panic_message(err.as_ref()), "non-string panic payload");
    }
}
