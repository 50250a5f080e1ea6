use super::{
    errors::SpawnError,
    result::SpawnResult,
};
use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll}
};
use futures::executor::block_on;
use tokio::{
    sync::oneshot::{self, error::TryRecvError},
    time::Duration,
};


/// Handle на результат задачи.
///
/// Заполняется ровно один раз воркером, который выполнил задачу. Если задача
/// была уничтожена, так и не запустившись, все чтения возвращают
/// [`SpawnError::ChannelClosed`] вместо вечного ожидания.
///
/// Блокирующие методы (`join`, `get`) предназначены для обычных потоков;
/// внутри async runtime handle нужно `.await`-ить.
pub struct JoinHandle<T> {
    receiver: oneshot::Receiver<SpawnResult<T>>,
    outcome: Option<SpawnResult<T>>,
}

// outcome никогда не пинится, poll работает только через &mut
impl<T> Unpin for JoinHandle<T> {}

impl<T> JoinHandle<T> {

    pub fn new(receiver: oneshot::Receiver<SpawnResult<T>>) -> Self {
        Self {
            receiver,
            outcome: None,
        }
    }

    /// Ждёт результат, не забирая receiver: повторные чтения идут из кэша
    fn wait_outcome(&mut self) -> &SpawnResult<T> {
        let receiver = &mut self.receiver;
        self.outcome.get_or_insert_with(|| {
            block_on(receiver).unwrap_or(Err(SpawnError::ChannelClosed))
        })
    }

    /// Блокирует текущий поток до завершения задачи и отдаёт результат.
    ///
    /// Из async кода handle нужно `.await`-ить, иначе блокируется поток runtime.
    pub fn join(mut self) -> SpawnResult<T> {
        match self.outcome.take() {
            Some(outcome) => outcome,
            None => block_on(&mut self.receiver).unwrap_or(Err(SpawnError::ChannelClosed)),
        }
    }

    /// Как [`join`](Self::join), но результат кэшируется и его можно читать
    /// сколько угодно раз.
    pub fn get(&mut self) -> Result<&T, SpawnError> {
        match self.wait_outcome() {
            Ok(value) => Ok(value),
            Err(e) => Err(e.clone()),
        }
    }

    /// Неблокирующий опрос: `None`, пока задача не выполнена
    pub fn try_get(&mut self) -> Option<Result<&T, SpawnError>> {
        if self.outcome.is_none() {
            let outcome = match self.receiver.try_recv() {
                Ok(res) => res,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => Err(SpawnError::ChannelClosed),
            };
            self.outcome = Some(outcome);
        }

        self.outcome.as_ref().map(|res| match res {
            Ok(value) => Ok(value),
            Err(e) => Err(e.clone()),
        })
    }

    #[inline]
    pub fn is_finished(&mut self) -> bool {
        self.try_get().is_some()
    }

    pub async fn await_timeout(self, timeout: Duration) -> SpawnResult<T> {
        match tokio::time::timeout(timeout, self).await {
            Ok(result) => result,
            Err(_) => Err(SpawnError::Timeout),
        }
    }
}

impl<T> Future for JoinHandle<T> {
    type Output = SpawnResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(outcome) = this.outcome.take() {
            return Poll::Ready(outcome);
        }
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(res) => Poll::Ready(res.unwrap_or(Err(SpawnError::ChannelClosed))),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> fmt::Debug for JoinHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinHandle")
            .field("cached", &self.outcome.is_some())
            .finish()
    }
}
