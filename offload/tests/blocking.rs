use std::{thread, time};

use offload::blocking::unblock;

#[offload::test]
async fn simple() {
  // Define a blocking operation
  let blocking_operation = || {
    thread::sleep(time::Duration::from_millis(100)); // Simulate a blocking operation
    42 // Return some result
  };

  // Call the unblock function with the blocking operation
  let result = unblock(blocking_operation).await;

  // Assert that the result is as expected
  assert_eq!(result, 42);
}

#[offload::test]
async fn sums_on_another_thread() {
  assert_eq!(unblock(|| 10 + 20).await, 30);
}

#[test]
fn get_result_blocks_for_the_value() {
  let task = unblock(|| {
    thread::sleep(time::Duration::from_millis(50));
    String::from("ready")
  });
  assert_eq!(task.get_result(), "ready");
}

#[test]
#[should_panic(expected = "attempt to divide by zero")]
fn divide_by_zero_reraises_at_get_result() {
  let divisor = std::hint::black_box(0_u32);
  let task = unblock(move || 1 / divisor);
  let _ = task.get_result();
}

#[test]
fn on_completed_runs_the_continuation_immediately() {
  let ran = std::cell::Cell::new(false);

  let task = unblock(|| ());
  task.on_completed(|| ran.set(true));

  // The continuation already ran, whether or not the closure finished.
  assert!(ran.get());

  task.get_result();
}

#[test]
fn is_completed_becomes_true() {
  let task = unblock(|| 7);
  while !task.is_completed() {
    thread::yield_now();
  }
  assert_eq!(task.get_result(), 7);
}

#[test]
fn fire_and_forget_still_runs() {
  let (done_tx, done_rx) = crossbeam_channel::bounded(1);

  drop(unblock(move || done_tx.send(42).unwrap()));

  // The adapter is gone but the closure still runs on its worker.
  assert_eq!(
    done_rx.recv_timeout(time::Duration::from_secs(5)),
    Ok(42)
  );
}
