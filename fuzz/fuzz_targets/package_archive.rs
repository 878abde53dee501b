#![no_main]

use libfuzzer_sys::fuzz_target;
use plugin_host::plugin::PackageArchive;
use std::io::Cursor;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut archive) = PackageArchive::from_reader(Cursor::new(data), Path::new("fuzz.pkg")) {
        for name in archive.entry_names() {
            let _ = archive.read_entry(&name);
        }
        let _ = archive.manifest();
    }
});
