#![no_main]

use libfuzzer_sys::fuzz_target;
use trims5::reader::{ReaderConfig, TriMs5Reader};

fuzz_target!(|data: &[u8]| {
    // Opening arbitrary bytes must fail with an error, never panic
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let path = dir.path().join("fuzz.trims5");
    if std::fs::write(&path, data).is_err() {
        return;
    }

    let Ok(reader) = TriMs5Reader::open_with_config(&path, ReaderConfig::eager()) else {
        return;
    };
    for index in 0..reader.size().min(100) {
        let _ = reader.spectrum(index, true);
    }
    for index in 0..reader.chromatogram_count().min(10) {
        let _ = reader.chromatogram(index, true);
    }
});
