#![no_main]

use libfuzzer_sys::fuzz_target;

use accrue_ledger::{LedgerSnapshot, TransferCoordinator};

// Arbitrary bytes must never panic the snapshot decoders, and anything that
// decodes must verify and restore.
fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = LedgerSnapshot::from_bytes(data) {
        assert!(snapshot.verify());
        let _ = TransferCoordinator::from_snapshot(&snapshot);
    }
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(snapshot) = LedgerSnapshot::from_json(text) {
            assert!(snapshot.verify());
        }
    }
});
