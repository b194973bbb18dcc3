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

//! # Managed Worker Threads
//!
//! [`WorkerThread`] owns the full lifecycle of one OS thread running a
//! [`TaskLoop`](crate::task::TaskLoop): spawning, startup handshaking,
//! running-state queries, and cooperative shutdown. The controller side and
//! the worker side coordinate through [`WaitableEvent`](crate::sync::WaitableEvent)s
//! and a shared observation slot; ownership of the task loop itself crosses
//! the thread boundary exactly once, at spawn.

mod options;
mod worker;

use std::fmt;

pub use options::{ThreadEnvironment, ThreadOptions, ThreadPriority};
pub use worker::{WorkerDelegate, WorkerThread};

/// A specialized `Result` type for thread lifecycle operations.
pub type ThreadResult<T> = Result<T, ThreadError>;

/// An error from a [`WorkerThread`] lifecycle operation.
#[derive(Debug)]
pub enum ThreadError {
    /// `start` was called while a previous worker is still alive.
    AlreadyStarted,
    /// The OS refused to create the worker thread. The controller is left
    /// untouched and a later `start` may succeed.
    SpawnFailed(std::io::Error),
}

impl fmt::Display for ThreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadError::AlreadyStarted => {
                write!(f, "Worker thread is already started")
            }
            ThreadError::SpawnFailed(err) => {
                write!(f, "Failed to spawn worker thread: {err}")
            }
        }
    }
}

impl std::error::Error for ThreadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ThreadError::AlreadyStarted => None,
            ThreadError::SpawnFailed(err) => Some(err),
        }
    }
}
