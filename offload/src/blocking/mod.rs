//! Entry points for offloading a blocking closure to a worker thread.
//!
//! [`spawn`] hands back the raw [`Deferred`] handle; [`unblock`] wraps it in
//! the [`Unblock`] adapter, which is the smallest surface an `await`-style
//! caller needs. Both start the closure immediately.

mod pool;

pub use pool::{Builder, Pool};

use std::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use crate::deferred::Deferred;

/// Schedules `f` on the shared pool and returns a handle to its result.
///
/// The closure starts running right away on a worker thread; the calling
/// thread is never blocked by this function. See [`Deferred`] for the ways
/// to get the value back out.
pub fn spawn<F, T>(f: F) -> Deferred<T>
where
  F: FnOnce() -> T + Send + 'static,
  T: Send + 'static,
{
  Pool::global().spawn(f)
}

/// Runs a blocking closure on the shared pool and returns an awaitable
/// handle to its result.
///
/// # Examples
///
/// ```rust
/// use offload::unblock;
///
/// # async fn example() {
/// let result = unblock(|| {
///     // CPU-intensive work or blocking I/O
///     std::thread::sleep(std::time::Duration::from_millis(100));
///     42
/// }).await;
/// assert_eq!(result, 42);
/// # }
/// ```
///
/// # Why use this?
///
/// A thread that serves many tasks, an async executor thread above all, must
/// never sit inside a long-running call: every other task sharing that
/// thread stops making progress until the call returns. Handing the closure
/// to a worker thread keeps the caller responsive, and the returned
/// [`Unblock`] lets the caller pick the result up exactly when it needs it,
/// by polling, by blocking, or with `.await`.
pub fn unblock<F, T>(f: F) -> Unblock<T>
where
  F: FnOnce() -> T + Send + 'static,
  T: Send + 'static,
{
  Unblock::new(Pool::global().spawn(f))
}

pin_project_lite::pin_project! {
  /// Suspension adapter over a [`Deferred`] handle.
  ///
  /// This is the minimal protocol an `await`-like caller needs, spelled out
  /// as three methods:
  ///
  /// - [`is_completed`](Unblock::is_completed): has the closure finished?
  /// - [`on_completed`](Unblock::on_completed): register a continuation.
  /// - [`get_result`](Unblock::get_result): fetch the value, blocking if
  ///   needed.
  ///
  /// Rust's own suspension protocol is [`Future::poll`], and `Unblock`
  /// implements that too, so `unblock(f).await` works as expected. The
  /// `Future` impl registers the caller's waker with the handle and the
  /// worker thread invokes it at completion, which is the correct way to
  /// defer a continuation; `on_completed` deliberately is not (see its
  /// docs).
  ///
  /// Dropping an `Unblock` without fetching the result leaves the closure
  /// running to completion on its worker (fire and forget).
  pub struct Unblock<T> {
    deferred: Deferred<T>,
  }
}

impl<T> Unblock<T> {
  fn new(deferred: Deferred<T>) -> Self {
    Unblock { deferred }
  }

  /// Like [`unblock`], but on an explicitly provided pool.
  pub fn on<F>(pool: &Pool, f: F) -> Self
  where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
  {
    Unblock::new(pool.spawn(f))
  }

  /// Whether the closure has finished. Delegates to
  /// [`Deferred::is_finished`]; never blocks.
  pub fn is_completed(&self) -> bool {
    self.deferred.is_finished()
  }

  /// Registers a continuation to run once the closure completes.
  ///
  /// Naive on purpose: the continuation runs immediately and synchronously,
  /// not at actual completion. A caller driving this protocol by hand must
  /// therefore re-check [`is_completed`](Unblock::is_completed) afterwards
  /// and fall back to the blocking
  /// [`get_result`](Unblock::get_result), which is what makes the shortcut
  /// safe. The [`Future`] impl is the correctly deferred version.
  pub fn on_completed<C>(&self, continuation: C)
  where
    C: FnOnce(),
  {
    continuation();
  }

  /// Returns the closure's value, blocking until it is available.
  ///
  /// Delegates to [`Deferred::join`]: if the closure panicked, the panic is
  /// resumed here.
  pub fn get_result(self) -> T {
    self.deferred.join()
  }
}

impl<T> Future for Unblock<T> {
  type Output = T;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.project();
    Pin::new(this.deferred).poll(cx)
  }
}
