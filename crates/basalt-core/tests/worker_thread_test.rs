// Copyright 2026 basalt developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lifecycle scenarios for the managed worker thread controller.

use basalt_core::task;
use basalt_core::thread::{ThreadError, WorkerDelegate, WorkerThread};
use crossbeam_channel::bounded;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Records which hooks ran, so tests can observe the worker's progress.
#[derive(Default)]
struct ProbeDelegate {
    init_done: AtomicBool,
    cleanup_done: AtomicBool,
    quit_properly_at_cleanup: AtomicBool,
}

impl WorkerDelegate for ProbeDelegate {
    fn on_init(&self) {
        self.init_done.store(true, Ordering::SeqCst);
    }

    fn on_cleanup(&self) {
        self.quit_properly_at_cleanup
            .store(WorkerThread::thread_was_quit_properly(), Ordering::SeqCst);
        self.cleanup_done.store(true, Ordering::SeqCst);
    }
}

#[test]
fn init_completes_before_wait_until_started_returns() {
    init_logging();
    let probe = Arc::new(ProbeDelegate::default());
    let worker = WorkerThread::with_delegate("init-order", probe.clone());

    worker.start().expect("start should succeed");
    assert!(worker.wait_until_started());
    assert!(
        probe.init_done.load(Ordering::SeqCst),
        "on_init must have completed before wait_until_started() returned"
    );

    worker.stop();
}

#[test]
fn thread_id_matches_the_thread_tasks_run_on() {
    init_logging();
    let worker = WorkerThread::new("id-check");
    worker.start().expect("start should succeed");

    // Safe to call while start() may still be handshaking.
    let reported = worker.thread_id();

    let (tx, rx) = bounded(1);
    worker
        .handle()
        .expect("worker is alive")
        .post_task(Box::new(move || {
            let _ = tx.send(std::thread::current().id());
        }))
        .expect("post should succeed");

    let observed = rx
        .recv_timeout(TEST_TIMEOUT)
        .expect("task should run within the test timeout");
    assert_eq!(reported, observed);

    worker.stop();
}

#[test]
fn stop_when_never_started_returns_without_blocking() {
    init_logging();
    let worker = WorkerThread::new("never-started");
    worker.stop();
    assert!(!worker.is_running());
}

#[test]
fn worker_a_happy_path() {
    init_logging();
    let worker = WorkerThread::new("worker-A");
    worker.start().expect("start should succeed");
    assert!(worker.wait_until_started());
    assert!(worker.is_running());

    worker.stop();
    assert!(!worker.is_running());
}

#[test]
fn restart_after_stop_succeeds() {
    init_logging();
    let worker = WorkerThread::new("restartable");

    worker.start().expect("first start should succeed");
    let first_id = worker.thread_id();
    worker.stop();
    assert!(!worker.is_running());

    worker.start().expect("restart should succeed");
    assert!(worker.wait_until_started());
    assert!(worker.is_running());
    // A fresh worker thread backs the restarted controller.
    assert_ne!(first_id, worker.thread_id());
    worker.stop();
}

#[test]
fn double_start_is_rejected() {
    init_logging();
    let worker = WorkerThread::new("double-start");
    worker.start().expect("first start should succeed");

    match worker.start() {
        Err(ThreadError::AlreadyStarted) => {}
        other => panic!("second start must be rejected, got {other:?}"),
    }

    worker.stop();
}

#[test]
fn dropping_a_started_controller_stops_the_worker() {
    init_logging();
    let probe = Arc::new(ProbeDelegate::default());
    let worker = WorkerThread::with_delegate("dropped", probe.clone());
    worker.start().expect("start should succeed");
    assert!(worker.wait_until_started());

    drop(worker);

    // Drop joins the worker, so by now the cleanup hook has run.
    assert!(
        probe.cleanup_done.load(Ordering::SeqCst),
        "dropping the controller must not leave the worker thread running"
    );
}

#[test]
fn stop_soon_then_stop_shuts_down_once() {
    init_logging();
    let worker = WorkerThread::new("stop-soon");
    worker.start().expect("start should succeed");
    assert!(worker.wait_until_started());

    worker.stop_soon();
    assert!(worker.is_stopping());
    worker.stop();
    assert!(!worker.is_running());
    assert!(!worker.is_stopping());
}

#[test]
fn in_loop_sanctioned_quit_sets_the_flag_and_ends_the_loop() {
    init_logging();
    let probe = Arc::new(ProbeDelegate::default());
    let worker = WorkerThread::with_delegate("self-quit", probe.clone());
    worker.start().expect("start should succeed");
    assert!(worker.wait_until_started());

    // The quit-helper protocol, driven from a task on the worker itself:
    // ask the current loop to quit and mark the shutdown as sanctioned.
    worker
        .handle()
        .expect("worker is alive")
        .post_task(Box::new(|| {
            task::current()
                .expect("a task always runs inside a loop")
                .request_quit_when_idle();
            WorkerThread::set_thread_was_quit_properly(true);
        }))
        .expect("post should succeed");

    // The loop ends without stop_soon(); stop() then just joins.
    worker.stop();
    assert!(probe.cleanup_done.load(Ordering::SeqCst));
    if cfg!(debug_assertions) {
        assert!(
            probe.quit_properly_at_cleanup.load(Ordering::SeqCst),
            "the sanctioned quit task must mark the shutdown as proper"
        );
    }
}
