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

//! # Basalt Core
//!
//! The concurrency core: synchronization primitives, the task-loop
//! abstraction, and the managed worker thread controller built on top
//! of them.

#![warn(missing_docs)]

pub mod sync;
pub mod task;
pub mod thread;

pub use task::{LoopHandle, LoopKind, TaskLoop};
pub use thread::{ThreadOptions, WorkerThread};
