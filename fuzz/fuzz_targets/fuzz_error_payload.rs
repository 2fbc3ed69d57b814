// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz ErrorPayload deserialization and conversion.
//!
//! Verifies:
//! 1. Deserializing arbitrary JSON as ErrorPayload never panics.
//! 2. Conversion to SkygearError keeps every field verbatim.
//! 3. Converting back yields the same payload.
#![no_main]
use libfuzzer_sys::fuzz_target;
use skygear_error::{ErrorPayload, SkygearError};

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = serde_json::from_slice::<ErrorPayload>(data) else {
        return;
    };

    let err = SkygearError::from(payload.clone());
    assert_eq!(err.code_value(), payload.code);
    assert_eq!(err.name(), payload.name.as_deref());
    assert_eq!(err.detail_message(), payload.message.as_deref());
    assert_eq!(err.info(), payload.info.as_ref());

    let back = ErrorPayload::from(&err);
    assert_eq!(back, payload);

    let json = serde_json::to_string(&back).expect("ErrorPayload must serialize");
    let _: ErrorPayload =
        serde_json::from_str(&json).expect("ErrorPayload round-trip must succeed");
});
