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

//! The worker thread controller and its entry point.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use crate::sync::{ResetPolicy, WaitableEvent};
use crate::task::{self, LoopHandle, LoopKind, TaskLoop};

use super::options::{ThreadEnvironment, ThreadOptions, ThreadPriority};
use super::{ThreadError, ThreadResult};

thread_local! {
    // Records whether this thread's loop exited through the sanctioned quit
    // task. Lets the entry point catch code that quit the loop directly
    // instead of going through stop_soon().
    static QUIT_PROPERLY: Cell<bool> = const { Cell::new(false) };
}

/// The sanctioned quit task posted by [`WorkerThread::stop_soon`]. Asks the
/// current loop to quit when idle and marks this thread's shutdown as
/// proper.
fn quit_task_loop_properly() {
    match task::current() {
        Some(handle) => handle.request_quit_when_idle(),
        None => log::error!("Quit task executed outside of a running task loop."),
    }
    WorkerThread::set_thread_was_quit_properly(true);
}

/// Customization hooks invoked at fixed points of the worker's lifetime,
/// always on the worker thread.
pub trait WorkerDelegate: Send + Sync {
    /// Runs after the loop is bound, before the startup handshake completes.
    fn on_init(&self) {}

    /// Drives the loop. The default drives it to completion; an override
    /// that never calls [`TaskLoop::run`] takes over the shutdown discipline
    /// too.
    fn on_run(&self, task_loop: &mut TaskLoop) {
        task_loop.run();
    }

    /// Runs after the loop has returned, before the thread exits.
    fn on_cleanup(&self) {}
}

/// The hook defaults are the whole behavior for plain worker threads.
struct DefaultDelegate;

impl WorkerDelegate for DefaultDelegate {}

/// State shared between the controller and the worker thread.
struct WorkerShared {
    name: String,
    /// The worker's OS-level id; write-once per run, published via
    /// `id_event`.
    id: Mutex<Option<ThreadId>>,
    id_event: WaitableEvent,
    /// Signaled once init hooks are done and the loop is about to run.
    start_event: WaitableEvent,
    /// The controller's observation view of the worker's loop. `Some` iff
    /// the controller believes a worker is alive; the worker clears it just
    /// before its entry point returns.
    loop_slot: Mutex<Option<LoopHandle>>,
    /// True only while the worker is inside its run hook.
    running: Mutex<bool>,
}

/// Owns the lifecycle of one OS thread running a [`TaskLoop`].
///
/// The thread that calls `start`/`stop`/queries is the *controller* thread;
/// the spawned thread is the *worker*. `stop` is synchronous and joins the
/// worker; dropping the controller stops it implicitly, so a worker never
/// outlives its controller.
///
/// ```no_run
/// use basalt_core::thread::WorkerThread;
///
/// let worker = WorkerThread::new("worker-A");
/// worker.start().expect("spawn failed");
/// worker
///     .handle()
///     .expect("just started")
///     .post_task(Box::new(|| log::info!("on the worker thread")))
///     .unwrap();
/// worker.stop();
/// ```
pub struct WorkerThread {
    shared: Arc<WorkerShared>,
    delegate: Arc<dyn WorkerDelegate>,
    /// Guards spawning and joining so a concurrent `stop` cannot observe a
    /// half-initialized handle.
    join_handle: Mutex<Option<JoinHandle<()>>>,
    /// True from the moment a stop has been requested until the worker has
    /// fully exited. Written only by the controller thread.
    stopping: AtomicBool,
}

impl WorkerThread {
    /// Creates a stopped controller whose worker thread, once started, will
    /// carry `name` for diagnostics.
    pub fn new(name: &str) -> Self {
        Self::with_delegate(name, Arc::new(DefaultDelegate))
    }

    /// Like [`new`](Self::new), with custom lifecycle hooks.
    pub fn with_delegate(name: &str, delegate: Arc<dyn WorkerDelegate>) -> Self {
        Self {
            shared: Arc::new(WorkerShared {
                name: name.to_owned(),
                id: Mutex::new(None),
                id_event: WaitableEvent::new(ResetPolicy::Manual, false),
                start_event: WaitableEvent::new(ResetPolicy::Manual, false),
                loop_slot: Mutex::new(None),
                running: Mutex::new(false),
            }),
            delegate,
            join_handle: Mutex::new(None),
            stopping: AtomicBool::new(false),
        }
    }

    /// The controller's identifying label.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Starts the worker thread with default options.
    pub fn start(&self) -> ThreadResult<()> {
        self.start_with_options(ThreadOptions::default())
    }

    /// Starts the worker thread.
    ///
    /// On success, ownership of the freshly created task loop has been
    /// transferred to the worker thread and the controller retains only an
    /// observation handle. On spawn failure the loop is released and the
    /// controller stays stopped and restartable.
    pub fn start_with_options(&self, options: ThreadOptions) -> ThreadResult<()> {
        if self.shared.loop_slot.lock().unwrap().is_some() {
            return Err(ThreadError::AlreadyStarted);
        }

        // Reset the id plumbing here so the controller can be restarted.
        self.shared.id_event.reset();
        *self.shared.id.lock().unwrap() = None;

        Self::set_thread_was_quit_properly(false);

        let mut task_loop = TaskLoop::create_unbound(options.kind, options.pump_factory);
        let observation = task_loop.handle();
        self.shared.start_event.reset();

        let params = WorkerParams {
            shared: Arc::clone(&self.shared),
            delegate: Arc::clone(&self.delegate),
            environment: options.environment,
            priority: options.priority,
            timer_granularity: options.timer_granularity,
        };

        // Hold the join lock while spawning so that a racing stop() either
        // sees no handle (and no-ops) or a fully recorded one.
        let mut join_handle = self.join_handle.lock().unwrap();
        *self.shared.loop_slot.lock().unwrap() = Some(observation);

        let mut builder = thread::Builder::new().name(self.shared.name.clone());
        if let Some(stack_size) = options.stack_size {
            builder = builder.stack_size(stack_size);
        }
        match builder.spawn(move || worker_main(params, task_loop)) {
            Ok(handle) => {
                *join_handle = Some(handle);
                Ok(())
            }
            Err(err) => {
                // The loop dies with this scope; the controller is reusable.
                *self.shared.loop_slot.lock().unwrap() = None;
                log::error!(
                    "Failed to create worker thread '{}': {err}",
                    self.shared.name
                );
                Err(ThreadError::SpawnFailed(err))
            }
        }
    }

    /// [`start`](Self::start) followed by
    /// [`wait_until_started`](Self::wait_until_started); fails if either
    /// fails.
    pub fn start_and_wait(&self) -> ThreadResult<()> {
        self.start()?;
        let started = self.wait_until_started();
        debug_assert!(started, "wait cannot fail after a successful start");
        Ok(())
    }

    /// Blocks until the worker has completed its init hook and is about to
    /// enter the loop.
    ///
    /// Returns `false` immediately if `start` never succeeded. May block
    /// indefinitely if the worker's init hook never completes; callers
    /// accept that risk knowingly.
    pub fn wait_until_started(&self) -> bool {
        if self.shared.loop_slot.lock().unwrap().is_none() {
            return false;
        }
        self.shared.start_event.wait();
        true
    }

    /// The worker's OS-level thread identifier.
    ///
    /// Blocks until the worker has published its id, so it is safe to call
    /// while `start` is still spawning. Blocks forever if the thread was
    /// never started.
    pub fn thread_id(&self) -> ThreadId {
        self.shared.id_event.wait();
        self.shared
            .id
            .lock()
            .unwrap()
            .expect("worker publishes its id before signaling id_event")
    }

    /// Whether the worker thread is up.
    ///
    /// Fast path: a live observation handle with no stop requested means
    /// running. Otherwise falls back to the `running` flag maintained by
    /// the worker around its run hook. Both tiers read under a lock.
    pub fn is_running(&self) -> bool {
        if self.shared.loop_slot.lock().unwrap().is_some() && !self.stopping.load(Ordering::SeqCst)
        {
            return true;
        }
        *self.shared.running.lock().unwrap()
    }

    /// Whether a stop has been requested but the worker has not yet fully
    /// exited. Meaningful on the controller thread.
    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    /// A posting handle for the worker's loop, or `None` when no worker is
    /// alive.
    pub fn handle(&self) -> Option<LoopHandle> {
        self.shared.loop_slot.lock().unwrap().clone()
    }

    /// Asynchronous shutdown request: marks the controller stopping and
    /// posts the sanctioned quit task. Does not block. No-op when already
    /// stopping or never started.
    ///
    /// Must not be called from the worker thread itself; the subsequent
    /// [`stop`](Self::stop) join would deadlock.
    pub fn stop_soon(&self) {
        if self.stopping.load(Ordering::SeqCst) {
            return;
        }
        let Some(observation) = self.shared.loop_slot.lock().unwrap().clone() else {
            return;
        };

        debug_assert_ne!(
            Some(thread::current().id()),
            *self.shared.id.lock().unwrap(),
            "stop_soon() called on the worker thread itself; stop() would deadlock"
        );

        self.stopping.store(true, Ordering::SeqCst);
        if observation.post_task(Box::new(quit_task_loop_properly)).is_err() {
            log::debug!(
                "Worker thread '{}' dropped its loop before the quit task landed.",
                self.shared.name
            );
        }
    }

    /// Synchronous shutdown: requests a stop and joins the worker thread.
    ///
    /// No-op if the thread was never started. On return the worker has
    /// fully quiesced, its loop is gone, and the controller is back in the
    /// stopped state, so a subsequent `start` is permitted.
    pub fn stop(&self) {
        let mut join_handle = self.join_handle.lock().unwrap();
        let Some(handle) = join_handle.take() else {
            return;
        };

        self.stop_soon();

        if handle.join().is_err() {
            log::error!("Worker thread '{}' panicked.", self.shared.name);
            // Keep the controller usable; the panicking worker may not have
            // cleared its slot.
            *self.shared.loop_slot.lock().unwrap() = None;
        }

        // The worker nulls the observation slot on its way out; join() is
        // the synchronization edge that makes the store visible here.
        debug_assert!(self.shared.loop_slot.lock().unwrap().is_none());

        self.stopping.store(false, Ordering::SeqCst);
    }

    /// Marks (or clears) the calling thread's "loop was quit through the
    /// sanctioned path" flag.
    pub fn set_thread_was_quit_properly(flag: bool) {
        QUIT_PROPERLY.with(|cell| cell.set(flag));
    }

    /// Whether the calling thread's loop was quit through the sanctioned
    /// path. Always `true` in release builds, where the protocol-bypass
    /// check is compiled out.
    pub fn thread_was_quit_properly() -> bool {
        if cfg!(debug_assertions) {
            QUIT_PROPERLY.with(|cell| cell.get())
        } else {
            true
        }
    }
}

impl Drop for WorkerThread {
    /// No worker thread survives its controller.
    fn drop(&mut self) {
        self.stop();
    }
}

/// Everything the entry point needs besides the loop itself.
struct WorkerParams {
    shared: Arc<WorkerShared>,
    delegate: Arc<dyn WorkerDelegate>,
    environment: Option<Arc<dyn ThreadEnvironment>>,
    priority: ThreadPriority,
    timer_granularity: Duration,
}

/// The worker thread entry point. Owns `task_loop` from here on; the
/// controller keeps only the observation handle in `shared.loop_slot`.
fn worker_main(params: WorkerParams, mut task_loop: TaskLoop) {
    let WorkerParams {
        shared,
        delegate,
        environment,
        priority,
        timer_granularity,
    } = params;

    // Publish the id before anything that can block or fail, so thread_id()
    // callers are never deadlocked by a later failure.
    *shared.id.lock().unwrap() = Some(thread::current().id());
    shared.id_event.signal();

    if priority != ThreadPriority::Normal {
        // std::thread has no portable priority control; record the request
        // so platform integrations can act on it.
        log::debug!(
            "Worker thread '{}' requested {priority:?} scheduling priority.",
            shared.name
        );
    }

    task_loop.bind_to_current_thread();
    task_loop.set_thread_name(&shared.name);
    task_loop.set_timer_granularity(timer_granularity);

    let environment_guard = environment.map(|environment| environment.enter());

    delegate.on_init();

    *shared.running.lock().unwrap() = true;
    shared.start_event.signal();

    log::debug!("Worker thread '{}' entering its loop.", shared.name);
    delegate.on_run(&mut task_loop);
    log::debug!("Worker thread '{}' left its loop.", shared.name);

    *shared.running.lock().unwrap() = false;

    delegate.on_cleanup();

    // Symmetric teardown of the per-thread environment, after cleanup hooks
    // and before the quiescence signal below.
    drop(environment_guard);

    if task_loop.kind() != LoopKind::Custom {
        // A custom pump owns its shutdown discipline and may legitimately
        // return without the sanctioned quit task having run; every other
        // kind must have gone through stop_soon().
        debug_assert!(
            WorkerThread::thread_was_quit_properly(),
            "worker thread '{}' quit without going through stop_soon()",
            shared.name
        );
    }

    // The designated quiescence signal: after this store, the controller's
    // join is the only thing left between it and a restart.
    *shared.loop_slot.lock().unwrap() = None;
    // task_loop drops here, on the thread that has owned it since spawn.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_before_start_is_a_noop() {
        let worker = WorkerThread::new("never-started");
        worker.stop();
        assert!(!worker.is_running());
        assert!(!worker.is_stopping());
    }

    #[test]
    fn wait_until_started_without_start_fails_fast() {
        let worker = WorkerThread::new("never-started");
        assert!(!worker.wait_until_started());
    }

    #[test]
    fn handle_is_none_until_started() {
        let worker = WorkerThread::new("never-started");
        assert!(worker.handle().is_none());
    }

    #[test]
    fn quit_properly_flag_is_per_thread() {
        WorkerThread::set_thread_was_quit_properly(true);
        let other = thread::spawn(WorkerThread::thread_was_quit_properly)
            .join()
            .expect("probe thread should not panic");
        if cfg!(debug_assertions) {
            assert!(!other, "a fresh thread starts with the flag unset");
        }
        assert!(WorkerThread::thread_was_quit_properly());
        WorkerThread::set_thread_was_quit_properly(false);
    }
}
