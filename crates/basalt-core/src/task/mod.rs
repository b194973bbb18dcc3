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

//! # Task Loops
//!
//! A [`TaskLoop`] is a schedulable run loop: it is created unbound, later
//! bound to exactly one OS thread, and then driven on that thread until a
//! quit request drains it. Work reaches the loop as posted closures through
//! a [`LoopHandle`], which is cheap to clone and safe to hand to any thread.
//!
//! The loop's driving strategy is a [`TaskPump`]. The default pump blocks on
//! the queue and executes tasks in posting order; passing a pump factory at
//! creation substitutes a custom strategy and forces the loop's kind to
//! [`LoopKind::Custom`].

mod pump;
mod task_loop;

use std::fmt;

pub use pump::{PumpContext, TaskPump};
pub use task_loop::{current, LoopHandle, TaskLoop};

/// A unit of work posted onto a [`TaskLoop`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Builds the [`TaskPump`] driving a custom loop. Invoked once, on the
/// thread the loop is bound to, when the loop first runs.
pub type PumpFactory = Box<dyn FnOnce() -> Box<dyn TaskPump> + Send + 'static>;

/// The category of a [`TaskLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// A general-purpose loop with no special pump behavior.
    Default,
    /// A loop intended to service user-interface work.
    Ui,
    /// A loop intended to service blocking I/O.
    Io,
    /// A loop driven by a caller-supplied [`TaskPump`]. Forced whenever a
    /// pump factory is passed at creation.
    Custom,
}

/// A specialized `Result` type for task-posting operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// An error that can occur when interacting with a [`TaskLoop`].
#[derive(Debug)]
pub enum TaskError {
    /// The loop's receiving side has been torn down; the task was dropped.
    LoopGone,
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::LoopGone => write!(f, "Task loop is gone; the task was dropped"),
        }
    }
}

impl std::error::Error for TaskError {}
