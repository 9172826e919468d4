use std::{collections::HashMap, sync::OnceLock, time::Duration};

use parking::{Parker, Unparker};

use crate::deferred::{Deferred, Slot};
use crate::loom::{
  sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
  },
  thread,
};

use private::JobRun;

/// A pool of worker threads for offloaded closures.
///
/// `Pool` is a cheap handle; clones share the same queue and workers. The
/// free functions in [`crate::blocking`] use a process-wide default pool, but
/// a pool is ordinary data and can be built and passed around explicitly:
///
/// ```rust
/// use offload::Pool;
///
/// let pool = Pool::builder().max_threads(2).build();
/// let handle = pool.spawn(|| 2 + 3);
/// assert_eq!(handle.join(), 5);
/// ```
#[derive(Clone)]
pub struct Pool {
  queue: (
    crossbeam_channel::Sender<Box<dyn JobRun>>,
    crossbeam_channel::Receiver<Box<dyn JobRun>>,
  ),
  workers: Arc<WorkerState>,
}

struct WorkerState {
  threads_running: AtomicUsize,
  threads_busy: AtomicUsize,
  max_threads: usize,
  keep_alive: Duration,
  unparkers: Mutex<HashMap<thread::ThreadId, Unparker>>,
  shutting_down: AtomicBool,
}

/// Configuration for a [`Pool`].
pub struct Builder {
  max_threads: usize,
  keep_alive: Duration,
}

impl Default for Builder {
  fn default() -> Self {
    Builder { max_threads: 500, keep_alive: Duration::from_secs(5) }
  }
}

impl Builder {
  /// Upper bound on worker threads. Workers are started lazily, one at a
  /// time, as jobs queue up.
  pub fn max_threads(mut self, max_threads: usize) -> Self {
    self.max_threads = max_threads;
    self
  }

  /// How long an idle worker parks before it exits.
  pub fn keep_alive(mut self, keep_alive: Duration) -> Self {
    self.keep_alive = keep_alive;
    self
  }

  pub fn build(self) -> Pool {
    Pool {
      queue: crossbeam_channel::unbounded(),
      workers: Arc::new(WorkerState {
        threads_running: AtomicUsize::new(0),
        threads_busy: AtomicUsize::new(0),
        max_threads: self.max_threads,
        keep_alive: self.keep_alive,
        unparkers: Mutex::new(HashMap::new()),
        shutting_down: AtomicBool::new(false),
      }),
    }
  }
}

impl Pool {
  pub fn builder() -> Builder {
    Builder::default()
  }

  /// The process-wide pool used by [`crate::blocking::spawn`] and
  /// [`crate::blocking::unblock`].
  pub(crate) fn global() -> &'static Pool {
    static GLOBAL: OnceLock<Pool> = OnceLock::new();
    GLOBAL.get_or_init(|| Pool::builder().build())
  }

  /// Schedules `f` on this pool and returns its handle. The closure starts
  /// as soon as a worker is free; this call never blocks.
  pub fn spawn<F, T>(&self, f: F) -> Deferred<T>
  where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
  {
    let slot = Arc::new(Slot::new());
    let handle = Deferred::new(slot.clone());
    self.schedule(Box::new(Job::new(slot, f)));
    handle
  }

  /// Stops the pool: idle workers are woken up and exit, running workers
  /// exit after their current job. Blocks until every worker is gone.
  ///
  /// Jobs scheduled after shutdown are not run; their handles report a
  /// failure instead of waiting forever.
  pub fn shutdown(&self) {
    self.workers.shutting_down.store(true, Ordering::Release);

    self.workers.unparkers.lock().unwrap().retain(|_, unparker| {
      unparker.unpark();
      false
    });

    while self.workers.threads_running.load(Ordering::Acquire) > 0 {
      std::thread::yield_now();
    }
  }

  fn schedule(&self, job: Box<dyn JobRun>) {
    if self.workers.shutting_down.load(Ordering::Acquire) {
      // Dropping the job reports the failure through its slot.
      return;
    }

    self
      .queue
      .0
      .send(job)
      .expect("queue receiver lives as long as the pool");

    match self.pop_idle() {
      Some(unparker) => {
        unparker.unpark();
      }
      None => self.add_thread(),
    }
  }

  fn pop_idle(&self) -> Option<Unparker> {
    let mut unparkers = self.workers.unparkers.lock().unwrap();
    let id = *unparkers.keys().next()?;
    unparkers.remove(&id)
  }

  fn add_thread(&self) {
    let running = self.workers.threads_running.load(Ordering::Acquire);
    if running == self.workers.max_threads {
      return;
    }
    if self.workers.threads_busy.load(Ordering::Acquire) != running {
      // Some worker is between jobs and will pick the new one up.
      return;
    }

    self.workers.threads_running.fetch_add(1, Ordering::AcqRel);
    let workers = self.workers.clone();
    let queue = self.queue.1.clone();
    thread::spawn(move || worker_loop(workers, queue));
  }
}

struct PanicGuard<'a>(&'a WorkerState, bool);

impl<'a> PanicGuard<'a> {
  fn new(workers: &'a WorkerState) -> Self {
    PanicGuard(workers, true)
  }

  fn disarm(&mut self) {
    self.1 = false;
  }
}

impl Drop for PanicGuard<'_> {
  fn drop(&mut self) {
    if self.1 && std::thread::panicking() {
      self.0.threads_running.fetch_sub(1, Ordering::AcqRel);
      self.0.threads_busy.fetch_sub(1, Ordering::AcqRel);
    }
  }
}

fn worker_loop(
  workers: Arc<WorkerState>,
  queue: crossbeam_channel::Receiver<Box<dyn JobRun>>,
) {
  tracing::trace!(thread_id = ?thread::current().id(), "worker starting");

  let mut guard = PanicGuard::new(&workers);
  let parker = Parker::new();

  loop {
    if workers.shutting_down.load(Ordering::Acquire) {
      break;
    }
    match queue.try_recv() {
      Ok(mut job) => {
        workers.threads_busy.fetch_add(1, Ordering::AcqRel);
        job.run();
        workers.threads_busy.fetch_sub(1, Ordering::AcqRel);
      }
      Err(crossbeam_channel::TryRecvError::Empty) => {
        workers
          .unparkers
          .lock()
          .unwrap()
          .insert(thread::current().id(), parker.unparker());

        // Ordered after the insert so a concurrent shutdown either sees the
        // unparker or is seen here.
        if workers.shutting_down.load(Ordering::Acquire) {
          workers.unparkers.lock().unwrap().remove(&thread::current().id());
          break;
        }

        let woken = parker.park_timeout(workers.keep_alive);
        let still_registered = workers
          .unparkers
          .lock()
          .unwrap()
          .remove(&thread::current().id())
          .is_some();

        // If the unparker was taken, a job was queued for this worker; go
        // look for it even if the park timed out first.
        if still_registered && !woken && queue.is_empty() {
          break;
        }
      }
      Err(crossbeam_channel::TryRecvError::Disconnected) => break,
    }
  }

  guard.disarm();
  workers.threads_running.fetch_sub(1, Ordering::AcqRel);
  tracing::trace!(thread_id = ?thread::current().id(), "worker shutting down");
}

pub(crate) struct Job<T: Send, F: FnOnce() -> T + Send> {
  func: Option<F>,
  slot: Option<Arc<Slot<T>>>,
}

impl<T: Send, F: FnOnce() -> T + Send> Job<T, F> {
  pub(crate) fn new(slot: Arc<Slot<T>>, func: F) -> Self {
    Job { func: Some(func), slot: Some(slot) }
  }
}

impl<T: Send, F: FnOnce() -> T + Send> Drop for Job<T, F> {
  fn drop(&mut self) {
    // Reached only when the job never ran. Complete the slot so a blocked
    // join does not wait forever.
    if let Some(slot) = self.slot.take() {
      slot
        .complete(Err(Box::new("job dropped before it ran: pool shut down")));
    }
  }
}

mod private {
  use std::panic::{self, AssertUnwindSafe};

  use super::Job;

  // Generic type erasing
  pub(crate) trait JobRun: Send {
    fn run(&mut self);
  }

  impl<T, F> JobRun for Job<T, F>
  where
    F: FnOnce() -> T + Send,
    T: Send,
  {
    fn run(&mut self) {
      let func = self.func.take().expect("job already ran");
      let slot = self.slot.take().expect("job already ran");
      let outcome = panic::catch_unwind(AssertUnwindSafe(func));
      slot.complete(outcome);
    }
  }
}
