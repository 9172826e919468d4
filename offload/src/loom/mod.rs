#![allow(unused_imports)]

pub(crate) mod sync {
  #[cfg(loom)]
  pub use loom::sync::{Arc, Mutex, MutexGuard};
  #[cfg(not(loom))]
  pub use std::sync::{Arc, Mutex, MutexGuard};

  pub mod atomic {
    #[cfg(loom)]
    pub use loom::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    #[cfg(not(loom))]
    pub use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
  }
}

#[cfg(loom)]
pub(crate) use loom::thread;

#[cfg(not(loom))]
pub(crate) use std::thread;
