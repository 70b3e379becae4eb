#![no_main]

use libfuzzer_sys::fuzz_target;
use quorum_core::{Ceremony, CeremonyConfig, CeremonyEvent};

fuzz_target!(|data: &[u8]| {
    // Parsing a script should not panic
    let Ok(events) = serde_json::from_slice::<Vec<CeremonyEvent>>(data) else {
        return;
    };

    // Round-trip
    if let Ok(json) = serde_json::to_vec(&events) {
        let reparsed: Vec<CeremonyEvent> = serde_json::from_slice(&json).unwrap();
        assert_eq!(events, reparsed);
    }

    let Ok(mut ceremony) = Ceremony::new(CeremonyConfig::default()) else {
        return;
    };
    for event in events {
        let _ = ceremony.dispatch(event);
    }
});
