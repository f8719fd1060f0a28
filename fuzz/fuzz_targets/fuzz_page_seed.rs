#![no_main]

use faremap_core::config::{MAX_RESULTS_WAIT_MS, MAX_ZOOM_LEVEL, PageSeed};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Seed JSON comes from a server template; the decoder must reject
    // anything malformed without panicking.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(seed) = PageSeed::from_json_str(text) else {
        return;
    };

    // A seed that decoded satisfies every validated range.
    if let Some(route) = &seed.route {
        assert!(route.len() >= 2, "validated route too short");
        assert!(
            route.iter().all(|p| p[0].is_finite() && p[1].is_finite()),
            "validated route has non-finite coordinate"
        );
    }
    assert!(seed.center[0].is_finite() && seed.center[1].is_finite());
    assert!(seed.zoom <= MAX_ZOOM_LEVEL, "zoom past ceiling");
    assert!(
        seed.results_wait_ms > 0 && seed.results_wait_ms <= MAX_RESULTS_WAIT_MS,
        "wait budget out of range"
    );

    // And survives a serialize/decode round trip.
    let json = serde_json::to_string(&seed).expect("validated seed serializes");
    let again = PageSeed::from_json_str(&json).expect("round trip decodes");
    assert_eq!(seed, again, "seed round trip diverged");
});
