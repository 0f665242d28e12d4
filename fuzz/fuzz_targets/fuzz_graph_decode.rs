#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Corrupt graph files must be rejected, never panic or loop
    let _ = lexsearch::graph::binary::decode(data, 15);
});
