// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz ErrorCode resolution and SkygearError construction.
//!
//! Verifies:
//! 1. `from_value` never panics and is stable for any integer.
//! 2. Unknown values resolve to the fallback; known values to their owner.
//! 3. SkygearError keeps the raw code verbatim and always renders.
#![no_main]
use libfuzzer_sys::fuzz_target;
use skygear_error::{ErrorCode, SkygearError};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let value = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let detail = String::from_utf8_lossy(&data[4..]);

    // --- Property 1 & 2: resolution is total ---
    let code = ErrorCode::from_value(value);
    assert_eq!(code, ErrorCode::from_value(value));
    if code.value() != value {
        assert!(code.is_fallback(), "non-matching value must fall back");
    }
    assert!(!code.message().is_empty());
    assert_eq!(ErrorCode::from_name(code.as_str()), Some(code));

    // --- Property 3: construction never fails ---
    let err = SkygearError::with_code(value, detail.into_owned());
    assert_eq!(err.code_value(), value);
    assert_eq!(err.code(), code);
    let display = format!("{err}");
    assert!(display.starts_with(code.message()));
    let debug = format!("{err:?}");
    assert!(!debug.is_empty());
});
