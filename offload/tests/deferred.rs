use std::future::Future;

use offload::{spawn, JoinError};

macro_rules! get_ready {
  ($expr:expr) => {{
    let mut pinned = std::pin::pin!($expr);
    match pinned
      .as_mut()
      .poll(&mut std::task::Context::from_waker(&futures_task::noop_waker()))
    {
      std::task::Poll::Ready(value) => value,
      std::task::Poll::Pending => unreachable!("was Poll::Pending"),
    }
  }};
}

macro_rules! should_pending {
  ($expr:expr) => {{
    let mut pinned = std::pin::pin!(&mut $expr);
    match pinned
      .as_mut()
      .poll(&mut std::task::Context::from_waker(&futures_task::noop_waker()))
    {
      std::task::Poll::Ready(_) => false,
      std::task::Poll::Pending => true,
    }
  }};
}

#[test]
fn pending_while_blocked_then_ready() {
  let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);

  let mut handle = spawn(move || {
    gate_rx.recv().unwrap();
    7_u8
  });

  // The closure is parked on the gate, so nothing can be finished yet.
  assert!(!handle.is_finished());
  assert!(should_pending!(handle));

  gate_tx.send(()).unwrap();
  while !handle.is_finished() {
    std::thread::yield_now();
  }

  assert_eq!(get_ready!(handle), 7);
}

#[test]
fn join_blocks_until_value() {
  let handle = spawn(|| {
    std::thread::sleep(std::time::Duration::from_millis(50));
    String::from("stable")
  });
  assert_eq!(handle.join(), "stable");
}

#[test]
fn join_after_completion_returns_same_value() {
  let handle = spawn(|| 10 + 20);
  while !handle.is_finished() {
    std::thread::yield_now();
  }
  // The value was fixed at completion; a late join observes the same one.
  assert_eq!(handle.join(), 30);
}

#[test]
#[should_panic(expected = "boom")]
fn join_resumes_the_panic() {
  spawn(|| -> () { panic!("boom") }).join();
}

#[test]
fn try_join_surfaces_the_panic_payload() {
  let handle = spawn(|| -> u8 { panic!("boom") });

  let err: JoinError = handle.try_join().unwrap_err();
  let payload = err.into_panic();

  assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
}

#[test]
fn dropped_handle_does_not_stop_the_closure() {
  let (done_tx, done_rx) = crossbeam_channel::bounded(1);

  drop(spawn(move || done_tx.send("ran").unwrap()));

  assert_eq!(
    done_rx.recv_timeout(std::time::Duration::from_secs(5)),
    Ok("ran")
  );
}
