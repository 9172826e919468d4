//! Run a long-running closure off the caller's thread, and `.await` it.
//!
//! # Why not just call it?
//!
//! A thread that is responsible for more than one piece of work must not sit
//! inside a long-running call. On a UI thread the window freezes; on a
//! single-threaded executor every other task stops making progress until the
//! call returns. The call itself is fine. Making everyone else wait for it
//! is not.
//!
//! The fix is always the same shape: run the operation somewhere else, and
//! pick the result up when it is ready. What varies is how the pickup is
//! written, and that is what this crate walks through.
//!
//! # Three ways to pick up a result
//!
//! **A raw thread.** Honest, but the caller ends up blocked in `join`, which
//! is exactly what we set out to avoid; it only moved the wait:
//!
//! ```rust
//! let worker = std::thread::spawn(|| 10 + 20);
//! // ... do something useful ...
//! assert_eq!(worker.join().unwrap(), 30);
//! ```
//!
//! **A callback continuation.** Nothing blocks, but control is inverted: the
//! code that needs the value no longer reads top to bottom, and every step
//! that follows has to live inside the callback:
//!
//! ```rust
//! let task = offload::unblock(|| 10 + 20);
//! task.on_completed(|| println!("about to have a value"));
//! assert_eq!(task.get_result(), 30);
//! ```
//!
//! **Await-style sequencing.** The code reads like the blocking version, and
//! the suspension point is explicit:
//!
//! ```rust
//! let value = offload::future::block_on(async {
//!   offload::unblock(|| 10 + 20).await
//! });
//! assert_eq!(value, 30);
//! ```
//!
//! # The two pieces
//!
//! - [`Deferred`]: a handle to a closure that is already running on a worker
//!   thread. It can say whether the closure has finished
//!   ([`is_finished`](Deferred::is_finished)) and it can block for the value
//!   ([`join`](Deferred::join)).
//! - [`Unblock`]: the suspension adapter over one `Deferred`. It is the
//!   smallest protocol an `await`-like caller needs (`is_completed`,
//!   `on_completed`, `get_result`), and it implements [`std::future::Future`]
//!   so the native `await` machinery can drive it.
//!
//! Closures run on a lazily grown worker [`Pool`]; the free functions use a
//! process-wide default, and an explicit pool can be built with
//! [`Pool::builder`] and passed where it is needed.
//!
//! # This is a teaching crate
//!
//! Everything here reimplements, in miniature, machinery that already
//! exists: `std::thread::spawn` plus a channel gives you the handle, and any
//! async runtime's `spawn_blocking` gives you the adapter, wired to a real
//! scheduler. The value of this crate is that the whole mechanism fits in a
//! few small files, so you can see precisely what an `await` on a background
//! computation desugars onto. Treat it as a reference design, not a
//! production dependency.

mod loom;

pub mod blocking;
mod deferred;
pub mod future;

pub use blocking::{spawn, unblock, Builder, Pool, Unblock};
pub use deferred::{Deferred, JoinError};

#[doc(hidden)]
pub use offload_macros::internal_test;
pub use offload_macros::{main, test};
