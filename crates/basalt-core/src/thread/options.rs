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

//! Startup configuration for a [`WorkerThread`](super::WorkerThread).

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::task::{LoopKind, PumpFactory};

/// The OS scheduling priority requested for a worker thread.
///
/// This is a hint; platforms that cannot honor it fall back to their
/// default scheduling class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadPriority {
    /// Suitable for threads that shouldn't disrupt high-priority work.
    Background,
    /// The default priority.
    Normal,
    /// Suitable for threads which generate data for the display.
    Display,
    /// Suitable for low-latency, glitch-resistant audio.
    RealtimeAudio,
}

/// Per-thread environment a worker must set up before running and tear down
/// symmetrically before exiting (an apartment-model analogue).
///
/// [`enter`](ThreadEnvironment::enter) is called on the worker thread before
/// the init hook; the returned guard is dropped after the cleanup hook, on
/// every exit path, so `Drop` on the guard is the teardown point.
pub trait ThreadEnvironment: Send + Sync {
    /// Sets up the calling thread's environment and returns its teardown
    /// guard.
    fn enter(&self) -> Box<dyn Any>;
}

/// Options captured at `start` time; immutable until the next `start`.
pub struct ThreadOptions {
    /// The category of task loop the worker drives.
    pub kind: LoopKind,
    /// Overrides the loop's driving strategy. Forces
    /// [`LoopKind::Custom`].
    pub pump_factory: Option<PumpFactory>,
    /// How much the worker's loop may coalesce timers.
    pub timer_granularity: Duration,
    /// The stack size requested for the worker thread, or `None` for the
    /// platform default.
    pub stack_size: Option<usize>,
    /// The scheduling priority requested for the worker thread.
    pub priority: ThreadPriority,
    /// Optional per-thread environment set up around the worker's lifetime.
    pub environment: Option<Arc<dyn ThreadEnvironment>>,
}

impl ThreadOptions {
    /// Options for a loop of the given kind, with everything else default.
    pub fn with_kind(kind: LoopKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}

impl Default for ThreadOptions {
    fn default() -> Self {
        Self {
            kind: LoopKind::Default,
            pump_factory: None,
            timer_granularity: Duration::ZERO,
            stack_size: None,
            priority: ThreadPriority::Normal,
            environment: None,
        }
    }
}

impl fmt::Debug for ThreadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadOptions")
            .field("kind", &self.kind)
            .field("has_pump_factory", &self.pump_factory.is_some())
            .field("timer_granularity", &self.timer_granularity)
            .field("stack_size", &self.stack_size)
            .field("priority", &self.priority)
            .field("has_environment", &self.environment.is_some())
            .finish()
    }
}
