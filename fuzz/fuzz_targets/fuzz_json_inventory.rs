#![no_main]
use about_tools::inventory::{load_inventory, RawInventory};
use libfuzzer_sys::fuzz_target;

/// Fuzz JSON inventory normalization and loading.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(inventory) = RawInventory::from_json_str(s) {
            let _ = load_inventory(&inventory, None);
        }
    }
});
