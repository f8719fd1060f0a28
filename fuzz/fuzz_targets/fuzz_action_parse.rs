#![no_main]

use faremap_core::actions::UiAction;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Action strings arrive from DOM attributes; parsing must never panic.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Some(action) = UiAction::parse(text) {
        // Whatever parses must re-encode to a string that parses back to
        // the same action.
        let encoded = action.encode();
        assert_eq!(
            UiAction::parse(&encoded),
            Some(action),
            "encode/parse identity broken"
        );
    }
});
