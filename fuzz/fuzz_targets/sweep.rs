#![no_main]

use arbitrary::Unstructured;

use libfuzzer_sys::fuzz_target;
use polycross::{find_intersections, sweep::brute_force};

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(segs) = polycross::arbitrary::segments(&mut u) else {
        return;
    };

    // The sweep can only miss pairs in near-degenerate cases, but it must never
    // report a pair that doesn't meet.
    let ints = find_intersections(&segs).unwrap();
    let reference = brute_force(&segs);
    for pair in &ints {
        assert!(reference.contains(pair.first(), pair.second()));
    }
});
