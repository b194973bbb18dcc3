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

//! Process-wide memory statistics collection.
//!
//! A [`MemoryDumpProvider`] is invoked by an external tracing subsystem to
//! fill a [`ProcessMemoryDump`]; the stateless
//! [`ProcessMemoryStatsProvider`] singleton is the provider for the current
//! process, backed by the `sysinfo` crate.

use std::sync::OnceLock;
use sysinfo::System;

/// How much detail a memory dump request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryDumpLevel {
    /// Totals only; cheap enough for periodic background collection.
    Background,
    /// Totals plus coarse per-region figures.
    Light,
    /// Everything the provider can report.
    Detailed,
}

/// Arguments passed along with a dump request.
#[derive(Debug, Clone, Copy)]
pub struct MemoryDumpArgs {
    /// The requested level of detail.
    pub level: MemoryDumpLevel,
}

/// A named chunk of the process address space reported in a dump.
#[derive(Debug, Clone)]
pub struct MemoryRegion {
    /// A human-readable label for the region.
    pub name: String,
    /// Bytes of the region currently resident in physical memory.
    pub resident_bytes: u64,
}

/// The sink a [`MemoryDumpProvider`] fills.
#[derive(Debug, Default)]
pub struct ProcessMemoryDump {
    resident_set_bytes: u64,
    virtual_bytes: u64,
    regions: Vec<MemoryRegion>,
}

impl ProcessMemoryDump {
    /// Creates an empty dump.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the process-wide totals.
    pub fn set_totals(&mut self, resident_set_bytes: u64, virtual_bytes: u64) {
        self.resident_set_bytes = resident_set_bytes;
        self.virtual_bytes = virtual_bytes;
    }

    /// Appends a named region.
    pub fn add_region(&mut self, region: MemoryRegion) {
        self.regions.push(region);
    }

    /// Bytes of the process currently resident in physical memory.
    pub fn resident_set_bytes(&self) -> u64 {
        self.resident_set_bytes
    }

    /// The process's total virtual address space usage, in bytes.
    pub fn virtual_bytes(&self) -> u64 {
        self.virtual_bytes
    }

    /// The regions reported so far.
    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }
}

/// Fills a [`ProcessMemoryDump`] on request from a tracing subsystem.
pub trait MemoryDumpProvider: Send + Sync {
    /// Collects memory statistics into `dump`.
    ///
    /// ## Returns
    /// `false` if the statistics could not be collected; the dump's partial
    /// contents must then be discarded by the caller.
    fn on_memory_dump(&self, args: &MemoryDumpArgs, dump: &mut ProcessMemoryDump) -> bool;
}

/// The dump provider for the current process's memory statistics.
///
/// Stateless; obtained through [`instance`](ProcessMemoryStatsProvider::instance)
/// so the tracing subsystem has a single registration point.
pub struct ProcessMemoryStatsProvider {
    _private: (),
}

impl ProcessMemoryStatsProvider {
    /// The process-wide provider instance.
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<ProcessMemoryStatsProvider> = OnceLock::new();
        INSTANCE.get_or_init(|| ProcessMemoryStatsProvider { _private: () })
    }
}

impl MemoryDumpProvider for ProcessMemoryStatsProvider {
    fn on_memory_dump(&self, args: &MemoryDumpArgs, dump: &mut ProcessMemoryDump) -> bool {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(err) => {
                log::error!("Could not resolve the current process id: {err}");
                return false;
            }
        };

        let system = System::new_all();
        let Some(process) = system.process(pid) else {
            log::error!("Current process {pid} is missing from the process table.");
            return false;
        };

        dump.set_totals(process.memory(), process.virtual_memory());

        if args.level == MemoryDumpLevel::Detailed {
            dump.add_region(MemoryRegion {
                name: "process_total".to_owned(),
                resident_bytes: process.memory(),
            });
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_reports_nonzero_totals() {
        let mut dump = ProcessMemoryDump::new();
        let args = MemoryDumpArgs {
            level: MemoryDumpLevel::Background,
        };

        assert!(ProcessMemoryStatsProvider::instance().on_memory_dump(&args, &mut dump));
        assert!(dump.resident_set_bytes() > 0);
        assert!(dump.regions().is_empty());
    }

    #[test]
    fn detailed_dump_includes_regions() {
        let mut dump = ProcessMemoryDump::new();
        let args = MemoryDumpArgs {
            level: MemoryDumpLevel::Detailed,
        };

        assert!(ProcessMemoryStatsProvider::instance().on_memory_dump(&args, &mut dump));
        assert_eq!(dump.regions().len(), 1);
        assert_eq!(dump.regions()[0].name, "process_total");
    }

    #[test]
    fn instance_is_shared() {
        let a = ProcessMemoryStatsProvider::instance() as *const _;
        let b = ProcessMemoryStatsProvider::instance() as *const _;
        assert!(std::ptr::eq(a, b));
    }
}
