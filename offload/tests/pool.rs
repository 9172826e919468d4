use std::time::Duration;

use offload::{Pool, Unblock};

#[test]
fn small_pool_runs_more_jobs_than_threads() {
  let pool = Pool::builder().max_threads(2).build();

  let handles: Vec<_> = (0..8_usize)
    .map(|i| {
      pool.spawn(move || {
        std::thread::sleep(Duration::from_millis(10));
        i * 2
      })
    })
    .collect();

  for (i, handle) in handles.into_iter().enumerate() {
    assert_eq!(handle.join(), i * 2);
  }
}

#[test]
fn adapter_on_injected_pool() {
  let pool = Pool::builder().max_threads(1).build();

  let task = Unblock::on(&pool, || "hello");

  assert_eq!(offload::future::block_on(task), "hello");
}

#[test]
fn clones_share_the_same_workers() {
  let pool = Pool::builder().max_threads(1).build();
  let clone = pool.clone();

  assert_eq!(pool.spawn(|| 1).join() + clone.spawn(|| 2).join(), 3);
}

#[test]
fn shutdown_stops_workers_and_fails_late_jobs() {
  let pool =
    Pool::builder().max_threads(4).keep_alive(Duration::from_secs(60)).build();

  assert_eq!(pool.spawn(|| 1).join(), 1);

  pool.shutdown();

  // Work scheduled after shutdown is reported as failed instead of queued
  // forever.
  let late = pool.spawn(|| 2);
  assert!(late.try_join().is_err());
}
