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

//! An in-memory key/value preference store with observer fan-out.
//!
//! Deliberately non-concurrent: the store lives on one thread and fans
//! change notifications out to registered observers synchronously.

use serde_json::Value;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Default write behavior.
pub const WRITE_FLAG_DEFAULT: u32 = 0;
/// The write may be persisted lazily by stores that persist at all.
pub const WRITE_FLAG_LOSSY: u32 = 1 << 0;

/// Receives change notifications from a [`ValueMapPrefStore`].
pub trait PrefObserver {
    /// A preference's stored value changed (or was removed).
    fn on_pref_value_changed(&self, key: &str);

    /// The store finished initializing.
    fn on_initialization_completed(&self, succeeded: bool);
}

/// Identifies a registered observer so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// A preference store backed by a plain in-memory map.
///
/// Values are [`serde_json::Value`]s. Mutations report whether they actually
/// changed anything; only real changes notify observers.
#[derive(Default)]
pub struct ValueMapPrefStore {
    prefs: BTreeMap<String, Value>,
    observers: Vec<(ObserverId, Rc<dyn PrefObserver>)>,
    next_observer_id: u64,
}

impl ValueMapPrefStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the value stored for `key`.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.prefs.get(key)
    }

    /// Registers an observer and returns its removal id.
    pub fn add_observer(&mut self, observer: Rc<dyn PrefObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Unregisters an observer. Unknown ids are ignored.
    pub fn remove_observer(&mut self, id: ObserverId) {
        self.observers.retain(|(observer_id, _)| *observer_id != id);
    }

    /// Whether any observer is currently registered.
    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    /// Stores `value` under `key`.
    ///
    /// ## Returns
    /// `true` iff the stored value actually changed, in which case observers
    /// are notified. `_flags` is carried through for interface parity; the
    /// map store has nothing to persist.
    pub fn set_value(&mut self, key: &str, value: Value, _flags: u32) -> bool {
        if self.prefs.get(key) == Some(&value) {
            return false;
        }
        self.prefs.insert(key.to_owned(), value);
        self.report_value_changed(key, _flags);
        true
    }

    /// Stores `value` under `key` without notifying observers.
    pub fn set_value_silently(&mut self, key: &str, value: Value, _flags: u32) {
        self.prefs.insert(key.to_owned(), value);
    }

    /// Removes any value stored under `key`, notifying observers iff one
    /// was present.
    pub fn remove_value(&mut self, key: &str, _flags: u32) -> bool {
        if self.prefs.remove(key).is_none() {
            return false;
        }
        self.report_value_changed(key, _flags);
        true
    }

    /// Fans an unconditional change notification for `key` out to every
    /// observer.
    pub fn report_value_changed(&self, key: &str, _flags: u32) {
        log::trace!("Preference '{key}' changed.");
        for (_, observer) in &self.observers {
            observer.on_pref_value_changed(key);
        }
    }

    /// Tells every observer that initialization finished successfully.
    pub fn notify_initialization_completed(&self) {
        for (_, observer) in &self.observers {
            observer.on_initialization_completed(true);
        }
    }
}
