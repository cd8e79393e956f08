#![no_main]

use libfuzzer_sys::fuzz_target;

use accrue_ledger::Account;
use accrue_types::{Rate, Timestamp};

fn read_u64(data: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[at..at + 8]);
    u64::from_le_bytes(buf)
}

// Fuzz balance computation and realization with arbitrary principal, rate
// and query times. Overflow must be reported, never panic or wrap.
fuzz_target!(|data: &[u8]| {
    if data.len() < 24 {
        return;
    }

    let principal = read_u64(data, 0);
    let rate = Rate::new(read_u64(data, 8));
    let opened = read_u64(data, 16);

    let mut account = Account::open(rate, Timestamp::new(opened));
    account.principal = principal;

    let mut offset = 24;
    while offset + 8 <= data.len() {
        let now = Timestamp::new(read_u64(data, offset));
        let before = account.clone();

        match account.realize(now) {
            Ok(delta) => {
                assert_eq!(account.principal, before.principal + delta);
                assert_eq!(account.last_accrual, now);
                // Idempotent at the same instant.
                assert_eq!(account.realize(now).ok(), Some(0));
            }
            Err(_) => assert_eq!(account, before),
        }

        offset += 8;
    }
});
