#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Malformed queries must come back as errors, never panics
    let _ = lexsearch::query::parse_spec(data);
});
