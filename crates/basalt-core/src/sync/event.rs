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

//! A binary event object in the style of the classic OS primitive.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Determines what happens to a [`WaitableEvent`]'s signaled state once a
/// waiter has been released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolicy {
    /// The event stays signaled until [`WaitableEvent::reset`] is called;
    /// every waiter (present and future) is released.
    Manual,
    /// Exactly one waiter is released per signal; the event resets itself
    /// as part of the wakeup.
    Automatic,
}

/// A binary synchronization primitive with `signal` / `wait` / `reset`.
///
/// Built on a [`Mutex`] + [`Condvar`] pair. Used by the threading layer to
/// publish one-shot facts across a thread boundary (thread id available,
/// initialization complete) without busy-waiting.
#[derive(Debug)]
pub struct WaitableEvent {
    policy: ResetPolicy,
    signaled: Mutex<bool>,
    cond: Condvar,
}

impl WaitableEvent {
    /// Creates an event with the given reset policy and initial state.
    pub fn new(policy: ResetPolicy, initially_signaled: bool) -> Self {
        Self {
            policy,
            signaled: Mutex::new(initially_signaled),
            cond: Condvar::new(),
        }
    }

    /// Puts the event into the signaled state, releasing waiters according
    /// to the reset policy.
    pub fn signal(&self) {
        let mut signaled = self.signaled.lock().unwrap();
        *signaled = true;
        match self.policy {
            ResetPolicy::Manual => self.cond.notify_all(),
            ResetPolicy::Automatic => self.cond.notify_one(),
        }
    }

    /// Returns the event to the non-signaled state.
    pub fn reset(&self) {
        *self.signaled.lock().unwrap() = false;
    }

    /// Blocks the calling thread until the event is signaled.
    ///
    /// For an [`ResetPolicy::Automatic`] event the signal is consumed, so
    /// exactly one blocked thread observes each signal.
    pub fn wait(&self) {
        let mut signaled = self.signaled.lock().unwrap();
        while !*signaled {
            signaled = self.cond.wait(signaled).unwrap();
        }
        if self.policy == ResetPolicy::Automatic {
            *signaled = false;
        }
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout`.
    ///
    /// Returns `true` if the event was signaled, `false` on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let signaled = self.signaled.lock().unwrap();
        let (mut signaled, result) = self
            .cond
            .wait_timeout_while(signaled, timeout, |signaled| !*signaled)
            .unwrap();
        if result.timed_out() && !*signaled {
            return false;
        }
        if self.policy == ResetPolicy::Automatic {
            *signaled = false;
        }
        true
    }

    /// Polls the event without blocking.
    ///
    /// Matches the OS-event model: a successful poll on an automatic-reset
    /// event consumes the signal.
    pub fn is_signaled(&self) -> bool {
        let mut signaled = self.signaled.lock().unwrap();
        let was_signaled = *signaled;
        if was_signaled && self.policy == ResetPolicy::Automatic {
            *signaled = false;
        }
        was_signaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn manual_reset_stays_signaled() {
        let event = WaitableEvent::new(ResetPolicy::Manual, false);
        event.signal();
        assert!(event.is_signaled());
        assert!(event.is_signaled());
        event.wait();
        event.reset();
        assert!(!event.is_signaled());
    }

    #[test]
    fn automatic_reset_consumes_signal() {
        let event = WaitableEvent::new(ResetPolicy::Automatic, false);
        event.signal();
        assert!(event.is_signaled());
        assert!(!event.is_signaled());
    }

    #[test]
    fn wait_timeout_reports_timeout() {
        let event = WaitableEvent::new(ResetPolicy::Manual, false);
        assert!(!event.wait_timeout(Duration::from_millis(20)));
        event.signal();
        assert!(event.wait_timeout(Duration::from_millis(20)));
    }

    #[test]
    fn signal_wakes_waiter_on_other_thread() {
        let event = Arc::new(WaitableEvent::new(ResetPolicy::Manual, false));
        let event_clone = Arc::clone(&event);

        let waiter = thread::spawn(move || {
            event_clone.wait();
        });

        thread::sleep(Duration::from_millis(20));
        event.signal();
        waiter.join().expect("waiter should be released");
    }

    #[test]
    fn automatic_reset_releases_one_waiter_per_signal() {
        let event = Arc::new(WaitableEvent::new(ResetPolicy::Automatic, false));
        let released = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let mut waiters = Vec::new();
        for _ in 0..2 {
            let event = Arc::clone(&event);
            let released = Arc::clone(&released);
            waiters.push(thread::spawn(move || {
                event.wait();
                released.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }));
        }

        thread::sleep(Duration::from_millis(20));
        event.signal();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(released.load(std::sync::atomic::Ordering::SeqCst), 1);

        event.signal();
        for waiter in waiters {
            waiter.join().expect("waiter should be released");
        }
        assert_eq!(released.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
