use std::{
  sync::Arc,
  task::{Wake, Waker},
  thread::Thread,
};

/// A waker that unparks the given thread.
pub(crate) fn unpark_waker(thread: Thread) -> Waker {
  Waker::from(Arc::new(Unpark(thread)))
}

struct Unpark(Thread);

impl Wake for Unpark {
  fn wake(self: Arc<Self>) {
    self.0.unpark();
  }

  fn wake_by_ref(self: &Arc<Self>) {
    self.0.unpark();
  }
}
