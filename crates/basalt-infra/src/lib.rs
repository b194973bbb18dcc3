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

//! # Basalt Infra
//!
//! Concrete collaborator subsystems consumed alongside the threading core:
//! an in-memory preference store with change-notification fan-out, a
//! process memory statistics provider, and the numeric error-code table.

#![warn(missing_docs)]

pub mod error_codes;
pub mod memory;
pub mod prefs;

pub use prefs::ValueMapPrefStore;
