#![no_main]

use libfuzzer_sys::fuzz_target;
use tangle_core::prefix::{longest_common_prefix, trim_prefix};

fuzz_target!(|values: Vec<String>| {
    let refs: Vec<&str> = values.iter().map(String::as_str).collect();
    let prefix = longest_common_prefix(&refs);
    for value in &refs {
        assert!(value.starts_with(prefix.as_str()));
        let _ = trim_prefix(value, &prefix);
    }
});
