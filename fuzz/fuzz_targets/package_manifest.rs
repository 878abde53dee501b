#![no_main]

use libfuzzer_sys::fuzz_target;
use plugin_host::plugin::PackageManifest;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(manifest) = PackageManifest::from_toml_str(s) {
            let _ = manifest.validate();
            let _ = manifest.check_host_compat("0.1.0");
        }
    }
});
