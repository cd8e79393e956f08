#![no_main]

use libfuzzer_sys::fuzz_target;

use accrue_ledger::TransferCoordinator;
use accrue_store::MemoryStore;
use accrue_types::{AccountId, LedgerParams, Rate, Timestamp, TransferAmount};

const ACCOUNTS: [&str; 4] = ["a", "b", "c", "d"];

// Drive a ledger with an arbitrary sequence of operations. Every rejected
// operation must leave the stored state exactly as it was, and the global
// rate must never rise.
fuzz_target!(|data: &[u8]| {
    let mut ledger = match TransferCoordinator::open(
        MemoryStore::new(),
        &LedgerParams::with_initial_rate(Rate::new(50_000_000_000_000_000)),
    ) {
        Ok(ledger) => ledger,
        Err(_) => return,
    };
    let mut now = 0u64;

    for op in data.chunks_exact(4) {
        now = now.saturating_add(u64::from(op[1] & 0x0f));
        let at = Timestamp::new(now);
        let from = AccountId::new(ACCOUNTS[usize::from(op[0] >> 4) % ACCOUNTS.len()]);
        let to = AccountId::new(ACCOUNTS[usize::from((op[1] >> 4) & 0x03)]);
        let amount = u64::from(u16::from_le_bytes([op[2], op[3]]));
        let sentinel = if op[1] & 0x80 != 0 {
            TransferAmount::Max
        } else {
            TransferAmount::Exact(amount)
        };

        let rate_before = ledger.global_rate();
        let before = ledger.ledger().accounts().ok();

        let result = match op[0] % 4 {
            0 => ledger.deposit(&from, amount, None, at).map(|_| ()),
            1 => ledger.withdraw(&from, sentinel, at).map(|_| ()),
            2 => ledger.transfer(&from, &to, sentinel, at).map(|_| ()),
            _ => ledger
                .set_global_rate(Rate::new(rate_before.raw().saturating_sub(amount)), at)
                .map(|_| ()),
        };

        assert!(ledger.global_rate() <= rate_before);
        if result.is_err() {
            assert_eq!(ledger.ledger().accounts().ok(), before);
        }
    }
});
