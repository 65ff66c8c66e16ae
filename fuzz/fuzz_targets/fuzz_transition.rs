#![no_main]

use libfuzzer_sys::fuzz_target;

use labseq_core::recurrence::Window;
use labseq_core::transition::Transition;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let a = u64::from(u16::from_le_bytes([data[0], data[1]])) % 4_000;
    let b = u64::from(u16::from_le_bytes([data[2], data[3]])) % 4_000;

    // M^a * M^b == M^(a+b), checked through the windows they produce.
    let composed = Transition::power(a).multiply(&Transition::power(b));
    let direct = Transition::power(a + b);
    let base = Window::base();
    assert_eq!(composed.apply(&base), direct.apply(&base));

    let mut stepped = Transition::power(a).apply(&base);
    for _ in 0..b.min(64) {
        stepped.advance();
    }
    assert_eq!(stepped, Transition::power(a + b.min(64)).apply(&base));
});
