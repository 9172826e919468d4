//! The three stages of not blocking the caller: a dedicated thread, a
//! callback continuation, and an awaitable handle.
//!
//! Run with `RUST_LOG`-style filtering to watch the pool's workers come and
//! go: `cargo run --example progression`.

use std::{thread, time::Duration};

use offload::unblock;

fn simulated_io(label: &'static str) -> u32 {
  tracing::debug!(label, "entering a long-running call");
  thread::sleep(Duration::from_millis(200));
  10 + 20
}

#[offload::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::TRACE)
    .init();

  // Stage 1: a dedicated thread. Honest, but the caller blocks in join,
  // which only moved the wait.
  let worker = thread::spawn(|| simulated_io("thread"));
  println!("thread:   {}", worker.join().unwrap());

  // Stage 2: a callback continuation. Nothing blocks, but control is
  // inverted and the follow-up code lives inside the callback.
  let task = unblock(|| simulated_io("callback"));
  task.on_completed(|| println!("callback: continuation ran"));
  println!("callback: {}", task.get_result());

  // Stage 3: await-style sequencing. Reads like the blocking version; the
  // suspension point is explicit.
  let value = unblock(|| simulated_io("await")).await;
  println!("await:    {value}");
}
