mod waker;

pub(crate) use waker::unpark_waker;

use std::{
  future::Future,
  task::{Context, Poll},
};

use crate::loom::thread;

/// Drives a single future to completion on the current thread.
///
/// Polls the future once, then parks the thread until the future's waker
/// fires and polls again. This is the entire "executor" the crate carries:
/// enough to `.await` an [`Unblock`](crate::Unblock) from synchronous code,
/// and what the [`macro@crate::main`] and [`macro@crate::test`] attributes
/// expand to.
///
/// ```rust
/// let value = offload::future::block_on(async { 1 + 2 });
/// assert_eq!(value, 3);
/// ```
pub fn block_on<Fut>(fut: Fut) -> Fut::Output
where
  Fut: Future,
{
  let waker = unpark_waker(thread::current());
  let mut cx = Context::from_waker(&waker);
  let mut pinned = std::pin::pin!(fut);

  loop {
    match pinned.as_mut().poll(&mut cx) {
      Poll::Ready(value) => return value,
      Poll::Pending => thread::park(),
    }
  }
}
