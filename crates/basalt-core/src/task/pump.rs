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

//! Pluggable driving strategies for a task loop.

use crossbeam_channel::Receiver;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::task_loop::LoopShared;
use super::Task;

/// The queue-facing view a [`TaskPump`] drives a loop through.
///
/// Borrowed from the running [`TaskLoop`](super::TaskLoop) for the duration
/// of [`TaskLoop::run`](super::TaskLoop::run); a pump never owns the queue.
pub struct PumpContext<'a> {
    receiver: &'a Receiver<Task>,
    shared: &'a LoopShared,
}

impl<'a> PumpContext<'a> {
    pub(super) fn new(receiver: &'a Receiver<Task>, shared: &'a LoopShared) -> Self {
        Self { receiver, shared }
    }

    /// Returns `true` once quit-when-idle has been requested.
    pub fn quit_requested(&self) -> bool {
        self.shared.quit_when_idle.load(Ordering::SeqCst)
    }

    /// Blocks until the next task is available. Returns `None` only if every
    /// handle to the loop has been dropped, in which case no task can ever
    /// arrive again.
    pub fn next_task(&self) -> Option<Task> {
        self.receiver.recv().ok()
    }

    /// Returns the next already-queued task, or `None` if the queue is
    /// momentarily empty.
    pub fn try_next_task(&self) -> Option<Task> {
        self.receiver.try_recv().ok()
    }

    /// Waits up to `timeout` for the next task.
    pub fn next_task_timeout(&self, timeout: Duration) -> Option<Task> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

/// The driving strategy of a [`TaskLoop`](super::TaskLoop).
///
/// [`run`](TaskPump::run) is called on the loop's bound thread and must not
/// return until [`PumpContext::quit_requested`] holds (or the queue has
/// disconnected). Custom pumps own their shutdown discipline; see
/// [`LoopKind::Custom`](super::LoopKind).
pub trait TaskPump: Send {
    /// Drives the loop to completion.
    fn run(&mut self, ctx: &PumpContext<'_>);
}

/// The built-in pump: execute tasks in posting order, and once quit has been
/// requested, drain whatever is already queued and return.
pub(super) struct DefaultPump;

impl TaskPump for DefaultPump {
    fn run(&mut self, ctx: &PumpContext<'_>) {
        while !ctx.quit_requested() {
            match ctx.next_task() {
                Some(task) => task(),
                // Every sender is gone; nothing can ever wake us again.
                None => break,
            }
        }
        while let Some(task) = ctx.try_next_task() {
            task();
        }
    }
}
