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

//! The task loop itself and its cross-thread posting handle.

use crossbeam_channel::{Receiver, Sender};
use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;

use super::pump::{DefaultPump, PumpContext};
use super::{LoopKind, PumpFactory, Task, TaskError, TaskPump, TaskResult};

thread_local! {
    static CURRENT: RefCell<Option<LoopHandle>> = const { RefCell::new(None) };
}

/// Returns a handle to the task loop currently running on this thread, if
/// any. Inside a posted task this is always `Some`.
pub fn current() -> Option<LoopHandle> {
    CURRENT.with(|current| current.borrow().clone())
}

/// State shared between a loop and all of its handles.
#[derive(Debug, Default)]
pub(super) struct LoopShared {
    pub(super) quit_when_idle: AtomicBool,
}

/// A cheap, cloneable, cross-thread handle to a [`TaskLoop`].
#[derive(Debug, Clone)]
pub struct LoopHandle {
    sender: Sender<Task>,
    shared: Arc<LoopShared>,
}

impl LoopHandle {
    /// Posts a task for asynchronous execution on the loop's bound thread.
    ///
    /// ## Returns
    /// An error if the loop has already been destroyed; the task is dropped
    /// in that case.
    pub fn post_task(&self, task: Task) -> TaskResult<()> {
        self.sender.send(task).map_err(|_| TaskError::LoopGone)
    }

    /// Asks the loop to finish every task already queued and then return
    /// from [`TaskLoop::run`].
    ///
    /// The request is observed when the loop next wakes, so a caller on
    /// another thread should pair it with a posted task (the threading
    /// layer's sanctioned quit task does exactly that).
    pub fn request_quit_when_idle(&self) {
        self.shared.quit_when_idle.store(true, Ordering::SeqCst);
    }
}

/// A run loop that executes posted tasks on the single thread it is bound to.
///
/// Lifecycle: [`create_unbound`](TaskLoop::create_unbound) on any thread,
/// [`bind_to_current_thread`](TaskLoop::bind_to_current_thread) exactly once
/// on the thread that will drive it, then [`run`](TaskLoop::run) until a
/// quit-when-idle request drains the queue.
pub struct TaskLoop {
    kind: LoopKind,
    name: String,
    timer_granularity: Duration,
    sender: Sender<Task>,
    receiver: Receiver<Task>,
    shared: Arc<LoopShared>,
    pump_factory: Option<PumpFactory>,
    pump: Option<Box<dyn TaskPump>>,
    bound_to: Option<ThreadId>,
}

impl TaskLoop {
    /// Creates a loop that is not yet attached to any thread.
    ///
    /// Supplying `pump_factory` overrides the driving strategy and forces
    /// the loop's kind to [`LoopKind::Custom`], whatever `kind` says.
    pub fn create_unbound(kind: LoopKind, pump_factory: Option<PumpFactory>) -> Self {
        let kind = if pump_factory.is_some() {
            LoopKind::Custom
        } else {
            kind
        };
        let (sender, receiver) = crossbeam_channel::unbounded();
        log::debug!("Created unbound {kind:?} task loop.");
        Self {
            kind,
            name: String::new(),
            timer_granularity: Duration::ZERO,
            sender,
            receiver,
            shared: Arc::new(LoopShared::default()),
            pump_factory,
            pump: None,
            bound_to: None,
        }
    }

    /// Returns a posting handle usable from any thread.
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            sender: self.sender.clone(),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Attaches the loop to the calling thread.
    ///
    /// A loop binds to exactly one thread, exactly once, for its entire
    /// lifetime; a second call is a contract violation and panics.
    pub fn bind_to_current_thread(&mut self) {
        assert!(
            self.bound_to.is_none(),
            "task loop '{}' is already bound to a thread",
            self.name
        );
        self.bound_to = Some(thread::current().id());
    }

    /// Records the diagnostic name of the thread driving this loop.
    pub fn set_thread_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    /// The diagnostic name recorded by [`set_thread_name`](Self::set_thread_name).
    pub fn thread_name(&self) -> &str {
        &self.name
    }

    /// Sets how much the loop may coalesce timers, as a scheduling hint.
    pub fn set_timer_granularity(&mut self, granularity: Duration) {
        self.timer_granularity = granularity;
    }

    /// The configured timer-coalescing granularity.
    pub fn timer_granularity(&self) -> Duration {
        self.timer_granularity
    }

    /// The loop's category.
    pub fn kind(&self) -> LoopKind {
        self.kind
    }

    /// Whether [`bind_to_current_thread`](Self::bind_to_current_thread) has
    /// happened.
    pub fn is_bound(&self) -> bool {
        self.bound_to.is_some()
    }

    /// Drives the loop until quit-when-idle has been requested and the queue
    /// has drained.
    ///
    /// Must be called on the bound thread. While running, the loop is
    /// published as [`current`] for this thread, so tasks can reach their
    /// own loop without threading a handle through.
    pub fn run(&mut self) {
        assert_eq!(
            self.bound_to,
            Some(thread::current().id()),
            "task loop '{}' must run on the thread it is bound to",
            self.name
        );

        // The pump for a custom loop is built lazily, here, so that it comes
        // to life on the bound thread.
        if self.pump.is_none() {
            self.pump = Some(match self.pump_factory.take() {
                Some(factory) => factory(),
                None => Box::new(DefaultPump),
            });
        }
        let mut pump = self.pump.take().unwrap();

        let _current = CurrentLoopGuard::install(self.handle());
        log::trace!("Task loop '{}' entering run().", self.name);
        let ctx = PumpContext::new(&self.receiver, &self.shared);
        pump.run(&ctx);
        log::trace!("Task loop '{}' exited run().", self.name);

        self.pump = Some(pump);
    }
}

impl fmt::Debug for TaskLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskLoop")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("bound_to", &self.bound_to)
            .finish_non_exhaustive()
    }
}

/// Unpublishes [`current`] when `run()` unwinds or returns.
struct CurrentLoopGuard;

impl CurrentLoopGuard {
    fn install(handle: LoopHandle) -> Self {
        CURRENT.with(|current| *current.borrow_mut() = Some(handle));
        CurrentLoopGuard
    }
}

impl Drop for CurrentLoopGuard {
    fn drop(&mut self) {
        CURRENT.with(|current| *current.borrow_mut() = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn executes_tasks_in_posting_order() {
        let mut task_loop = TaskLoop::create_unbound(LoopKind::Default, None);
        let handle = task_loop.handle();
        let order = Arc::new(Mutex::new(Vec::new()));

        for n in 0..3 {
            let order = Arc::clone(&order);
            handle
                .post_task(Box::new(move || order.lock().unwrap().push(n)))
                .expect("post should succeed");
        }
        handle.request_quit_when_idle();

        task_loop.bind_to_current_thread();
        task_loop.run();

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn current_is_published_while_running() {
        assert!(current().is_none());

        let mut task_loop = TaskLoop::create_unbound(LoopKind::Default, None);
        let handle = task_loop.handle();
        let saw_current = Arc::new(AtomicBool::new(false));
        let saw_current_clone = Arc::clone(&saw_current);

        handle
            .post_task(Box::new(move || {
                if let Some(me) = current() {
                    saw_current_clone.store(true, Ordering::SeqCst);
                    me.request_quit_when_idle();
                }
            }))
            .expect("post should succeed");

        task_loop.bind_to_current_thread();
        task_loop.run();

        assert!(saw_current.load(Ordering::SeqCst));
        assert!(current().is_none());
    }

    #[test]
    fn pump_factory_forces_custom_kind() {
        struct NoopPump;
        impl TaskPump for NoopPump {
            fn run(&mut self, _ctx: &PumpContext<'_>) {}
        }

        let factory: PumpFactory = Box::new(|| Box::new(NoopPump));
        let task_loop = TaskLoop::create_unbound(LoopKind::Io, Some(factory));
        assert_eq!(task_loop.kind(), LoopKind::Custom);
    }

    #[test]
    fn custom_pump_drives_the_loop() {
        struct CountingPump {
            ran: Arc<AtomicBool>,
        }
        impl TaskPump for CountingPump {
            fn run(&mut self, ctx: &PumpContext<'_>) {
                while let Some(task) = ctx.try_next_task() {
                    task();
                }
                self.ran.store(true, Ordering::SeqCst);
            }
        }

        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = Arc::clone(&ran);
        let factory: PumpFactory = Box::new(move || Box::new(CountingPump { ran: ran_clone }));

        let mut task_loop = TaskLoop::create_unbound(LoopKind::Default, Some(factory));
        task_loop.bind_to_current_thread();
        task_loop.run();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    #[should_panic(expected = "already bound")]
    fn double_bind_panics() {
        let mut task_loop = TaskLoop::create_unbound(LoopKind::Default, None);
        task_loop.bind_to_current_thread();
        task_loop.bind_to_current_thread();
    }

    #[test]
    fn quit_before_run_still_drains_queued_tasks() {
        let mut task_loop = TaskLoop::create_unbound(LoopKind::Default, None);
        let handle = task_loop.handle();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = Arc::clone(&ran);

        handle
            .post_task(Box::new(move || ran_clone.store(true, Ordering::SeqCst)))
            .expect("post should succeed");
        handle.request_quit_when_idle();

        task_loop.bind_to_current_thread();
        task_loop.run();
        assert!(ran.load(Ordering::SeqCst));
    }
}
