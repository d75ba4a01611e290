#![no_main]

use libfuzzer_sys::fuzz_target;
use rider_layout::{DescriptorRequest, LayoutOptions, RuntimeMode, resolve_descriptor};

fuzz_target!(|data: &[u8]| {
    let Ok(request) = serde_json::from_slice::<DescriptorRequest>(data) else {
        return;
    };
    let strict = resolve_descriptor(&request, &LayoutOptions::default());
    let hardened = resolve_descriptor(
        &request,
        &LayoutOptions::default().with_mode(RuntimeMode::Hardened),
    );
    if strict.is_err() && hardened.is_ok() {
        panic!("hardened mode accepted a request strict mode rejected");
    }
    if let (Ok(strict), Ok(hardened)) = (&strict, &hardened)
        && strict != hardened
    {
        panic!("hardened mode resolved a different layout");
    }
});
