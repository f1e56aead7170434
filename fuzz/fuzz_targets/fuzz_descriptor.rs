#![no_main]
use about_tools::model::{descriptor, About, ResourcePolicy};
use libfuzzer_sys::fuzz_target;

/// Fuzz the descriptor parser and record construction.
fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(fields) = descriptor::parse(text) {
            let (about, _) = About::from_mapping(
                &fields,
                &ResourcePolicy::FromDescriptorName("fuzz".to_string()),
            );
            if let Some(about) = about {
                let _ = descriptor::parse(&about.dumps());
            }
        }
    }
});
