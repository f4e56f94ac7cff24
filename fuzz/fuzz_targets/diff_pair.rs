#![no_main]
use libfuzzer_sys::fuzz_target;

use alsdiff::{diff_documents, parse, report, Config};

// Split the input on the first NUL byte into an old and a new document
fuzz_target!(|data: &[u8]| {
    let Some(split) = data.iter().position(|b| *b == 0) else {
        return;
    };
    let (old, new) = data.split_at(split);
    let (Ok(old), Ok(new)) = (parse(old), parse(new.get(1..).unwrap_or_default())) else {
        return;
    };

    let config = Config::default();
    if let Ok(changes) = diff_documents(&old, &new, &config) {
        let _ = report::render(&changes);
    }
    // a document never differs from itself
    if let Ok(changes) = diff_documents(&old, &old, &config) {
        assert!(changes.is_empty());
    }
});
