// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz ErrorConfig TOML parsing, validation and catalog construction.
//!
//! Feeds arbitrary byte strings through `parse_toml` and `validate_config`,
//! verifying:
//! 1. `parse_toml` never panics on arbitrary input.
//! 2. Successfully parsed configs can be validated without panics.
//! 3. A config that validates always builds a total `MessageCatalog`.
#![no_main]
use libfuzzer_sys::fuzz_target;
use skygear_config::{MessageCatalog, parse_toml, validate_config};
use skygear_error::ErrorCode;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // --- Property 1: parse_toml never panics ---
    let Ok(config) = parse_toml(s) else {
        return;
    };

    // --- Property 2: validate_config never panics ---
    match validate_config(&config) {
        Ok(warnings) => {
            for w in &warnings {
                let _ = format!("{w}");
            }
            // --- Property 3: catalog is total ---
            let catalog = MessageCatalog::from_config(&config).expect("validated config");
            for code in ErrorCode::ALL {
                assert!(!catalog.message(*code).trim().is_empty());
            }
        }
        Err(e) => {
            let _ = format!("{e}");
        }
    }

    if let Ok(toml_str) = toml::to_string(&config) {
        let _ = parse_toml(&toml_str);
    }
});
