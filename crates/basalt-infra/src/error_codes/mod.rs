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

//! The numeric error-code table.
//!
//! Codes are `0` for success and negative for failures, so they can travel
//! through interfaces that smuggle status in an integer. The table is pure
//! data; [`error_to_string`] is a stateless lookup.

/// The name prefixed to every stringified code.
pub const ERROR_DOMAIN: &str = "basalt";

/// Success.
pub const OK: i32 = 0;
/// An asynchronous operation is still pending.
pub const ERR_IO_PENDING: i32 = -1;
/// A generic failure with no better classification.
pub const ERR_FAILED: i32 = -2;
/// The operation was aborted, usually by the caller.
pub const ERR_ABORTED: i32 = -3;
/// An argument was malformed or out of range.
pub const ERR_INVALID_ARGUMENT: i32 = -4;
/// A handle or descriptor was invalid.
pub const ERR_INVALID_HANDLE: i32 = -5;
/// The named file or directory does not exist.
pub const ERR_FILE_NOT_FOUND: i32 = -6;
/// The operation did not complete in time.
pub const ERR_TIMED_OUT: i32 = -7;
/// The file is too large for the operation.
pub const ERR_FILE_TOO_BIG: i32 = -8;
/// An unexpected condition; indicates a bug.
pub const ERR_UNEXPECTED: i32 = -9;
/// Permission was denied.
pub const ERR_ACCESS_DENIED: i32 = -10;
/// The requested functionality is not implemented.
pub const ERR_NOT_IMPLEMENTED: i32 = -11;
/// A non-memory resource was exhausted.
pub const ERR_INSUFFICIENT_RESOURCES: i32 = -12;
/// Memory allocation failed.
pub const ERR_OUT_OF_MEMORY: i32 = -13;

/// Whether `code` is the success code.
pub fn is_ok(code: i32) -> bool {
    code == OK
}

/// Stringifies an error code, e.g. `-2` to `"basalt::ERR_FAILED"`.
///
/// Unknown codes map to `"basalt::<unknown>"` rather than panicking, since
/// codes routinely arrive from outside the process.
pub fn error_to_string(code: i32) -> &'static str {
    match code {
        OK => "basalt::OK",
        ERR_IO_PENDING => "basalt::ERR_IO_PENDING",
        ERR_FAILED => "basalt::ERR_FAILED",
        ERR_ABORTED => "basalt::ERR_ABORTED",
        ERR_INVALID_ARGUMENT => "basalt::ERR_INVALID_ARGUMENT",
        ERR_INVALID_HANDLE => "basalt::ERR_INVALID_HANDLE",
        ERR_FILE_NOT_FOUND => "basalt::ERR_FILE_NOT_FOUND",
        ERR_TIMED_OUT => "basalt::ERR_TIMED_OUT",
        ERR_FILE_TOO_BIG => "basalt::ERR_FILE_TOO_BIG",
        ERR_UNEXPECTED => "basalt::ERR_UNEXPECTED",
        ERR_ACCESS_DENIED => "basalt::ERR_ACCESS_DENIED",
        ERR_NOT_IMPLEMENTED => "basalt::ERR_NOT_IMPLEMENTED",
        ERR_INSUFFICIENT_RESOURCES => "basalt::ERR_INSUFFICIENT_RESOURCES",
        ERR_OUT_OF_MEMORY => "basalt::ERR_OUT_OF_MEMORY",
        _ => "basalt::<unknown>",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_is_ok() {
        assert!(is_ok(OK));
        assert!(!is_ok(ERR_FAILED));
    }

    #[test]
    fn known_codes_stringify() {
        assert_eq!(error_to_string(OK), "basalt::OK");
        assert_eq!(error_to_string(ERR_ABORTED), "basalt::ERR_ABORTED");
        assert_eq!(error_to_string(ERR_OUT_OF_MEMORY), "basalt::ERR_OUT_OF_MEMORY");
    }

    #[test]
    fn unknown_codes_do_not_panic() {
        assert_eq!(error_to_string(-9999), "basalt::<unknown>");
        assert_eq!(error_to_string(1), "basalt::<unknown>");
    }
}
