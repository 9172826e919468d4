use std::{
  any::Any,
  fmt,
  future::Future,
  panic,
  pin::Pin,
  task::{Context, Poll, Waker},
};

use thiserror::Error;

use crate::loom::sync::{Arc, Mutex};

/// What the offloaded closure produced: its return value, or the payload of
/// the panic it died with.
pub(crate) type Outcome<T> = std::thread::Result<T>;

/// Completion slot shared between the worker thread and the handle.
///
/// The worker writes exactly once; the handle reads exactly once. Everything
/// goes through one small state machine behind a mutex.
pub(crate) enum State<T> {
  /// The closure has been scheduled and has not finished yet.
  Running,
  /// A consumer polled while the closure was still running and left its
  /// waker behind.
  Waiting(Waker),
  /// The closure returned or panicked. `None` once the outcome was taken.
  Finished(Option<Outcome<T>>),
  /// The handle was dropped before completion. The worker drops the outcome
  /// instead of storing it.
  Detached,
}

pub(crate) struct Slot<T>(Mutex<State<T>>);

impl<T> Slot<T> {
  pub(crate) fn new() -> Self {
    Slot(Mutex::new(State::Running))
  }

  /// Worker side: publish the outcome and wake whoever is waiting.
  pub(crate) fn complete(&self, outcome: Outcome<T>) {
    let mut state = self.0.lock().unwrap();
    match std::mem::replace(&mut *state, State::Finished(Some(outcome))) {
      State::Running => {}
      State::Waiting(waker) => {
        drop(state);
        waker.wake();
      }
      State::Detached => {
        // Nobody can fetch the outcome anymore.
        *state = State::Detached;
      }
      State::Finished(_) => unreachable!("closure completed twice"),
    }
  }

  fn poll_take(&self, cx: &mut Context<'_>) -> Poll<Outcome<T>> {
    let mut state = self.0.lock().unwrap();
    match &mut *state {
      State::Finished(outcome) => {
        Poll::Ready(outcome.take().expect("outcome already taken"))
      }
      State::Running | State::Waiting(_) => {
        *state = State::Waiting(cx.waker().clone());
        Poll::Pending
      }
      State::Detached => unreachable!("slot detached while a handle is alive"),
    }
  }

  fn is_finished(&self) -> bool {
    matches!(&*self.0.lock().unwrap(), State::Finished(_))
  }

  fn detach(&self) {
    let mut state = self.0.lock().unwrap();
    if !matches!(&*state, State::Finished(_)) {
      *state = State::Detached;
    }
  }
}

/// A handle to a closure that is already running on a worker thread.
///
/// Created by [`spawn`](crate::blocking::spawn) or
/// [`Pool::spawn`](crate::blocking::Pool::spawn); the closure starts the
/// moment the handle exists. The handle can poll for completion without
/// blocking, block until the value is ready, or be awaited as a [`Future`].
///
/// # Examples
///
/// ```rust
/// let handle = offload::spawn(|| {
///   std::thread::sleep(std::time::Duration::from_millis(10));
///   10 + 20
/// });
///
/// // The caller is free to do other work here.
///
/// assert_eq!(handle.join(), 30);
/// ```
///
/// # Drop behavior
///
/// Dropping the handle does not stop the closure; it keeps running on its
/// worker thread and its result is discarded on completion.
pub struct Deferred<T> {
  slot: Arc<Slot<T>>,
}

impl<T> Deferred<T> {
  pub(crate) fn new(slot: Arc<Slot<T>>) -> Self {
    Deferred { slot }
  }

  /// Whether the closure has returned or panicked. Never blocks and is safe
  /// to call in a loop.
  pub fn is_finished(&self) -> bool {
    self.slot.is_finished()
  }

  /// Blocks the calling thread until the closure finishes, then returns its
  /// value.
  ///
  /// If the closure panicked, the panic is resumed on the calling thread.
  /// The first observer re-raises; the worker thread itself survives.
  pub fn join(self) -> T {
    match self.try_join() {
      Ok(value) => value,
      Err(err) => panic::resume_unwind(err.into_panic()),
    }
  }

  /// Like [`join`](Deferred::join), but surfaces a panic as a [`JoinError`]
  /// instead of resuming it.
  pub fn try_join(self) -> Result<T, JoinError> {
    let outcome = crate::future::block_on(std::future::poll_fn(|cx| {
      self.slot.poll_take(cx)
    }));
    outcome.map_err(JoinError::new)
  }
}

impl<T> Drop for Deferred<T> {
  fn drop(&mut self) {
    self.slot.detach();
  }
}

impl<T> Future for Deferred<T> {
  type Output = T;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    self.slot.poll_take(cx).map(|outcome| match outcome {
      Ok(value) => value,
      Err(payload) => panic::resume_unwind(payload),
    })
  }
}

#[cfg(test)]
static_assertions::assert_impl_all!(Deferred<()>: Send);
#[cfg(test)]
static_assertions::assert_impl_all!(Deferred<String>: Send, Unpin);

/// An offloaded closure panicked instead of returning a value.
///
/// Returned by [`Deferred::try_join`]. Holds the panic payload so the caller
/// can inspect it or re-raise it with [`std::panic::resume_unwind`].
#[derive(Error)]
#[error("offloaded closure panicked")]
pub struct JoinError {
  payload: Box<dyn Any + Send + 'static>,
}

impl JoinError {
  fn new(payload: Box<dyn Any + Send + 'static>) -> Self {
    JoinError { payload }
  }

  /// Consumes the error, yielding the payload the closure panicked with.
  pub fn into_panic(self) -> Box<dyn Any + Send + 'static> {
    self.payload
  }
}

impl fmt::Debug for JoinError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("JoinError(..)")
  }
}

#[crate::internal_test]
async fn awaits_value_from_worker() {
  let value = crate::blocking::unblock(|| 4 + 4).await;
  assert_eq!(value, 8);
}
