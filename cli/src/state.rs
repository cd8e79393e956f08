//! Ledger persistence between invocations.
//!
//! The ledger lives in memory for the duration of one command and is written
//! back as a verified JSON snapshot. Writes go through a temporary file in the
//! same directory and are renamed into place, so an interrupted write never
//! leaves a truncated state file behind.

use accrue_ledger::{LedgerSnapshot, TransferCoordinator};
use accrue_store::MemoryStore;
use accrue_types::{LedgerParams, Timestamp};
use anyhow::{bail, Context};
use std::io::Write;
use std::path::Path;

pub type Ledger = TransferCoordinator<MemoryStore>;

/// Create an empty ledger and write it to `path`.
pub fn init(path: &Path, params: &LedgerParams, now: Timestamp, force: bool) -> anyhow::Result<Ledger> {
    if path.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", path.display());
    }
    let ledger = TransferCoordinator::open(MemoryStore::new(), params)?;
    save(path, &ledger, now)?;
    Ok(ledger)
}

/// Read and verify the snapshot at `path`.
pub fn load(path: &Path) -> anyhow::Result<Ledger> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read ledger state {} (run `accrue init` first)", path.display()))?;
    let snapshot = LedgerSnapshot::from_json(&json)
        .with_context(|| format!("corrupt ledger state {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        accounts = snapshot.account_count(),
        hash = %snapshot.hash_hex(),
        "loaded ledger state"
    );
    Ok(TransferCoordinator::from_snapshot(&snapshot)?)
}

/// Snapshot `ledger` at `now` and atomically replace the file at `path`.
pub fn save(path: &Path, ledger: &Ledger, now: Timestamp) -> anyhow::Result<()> {
    let snapshot = ledger.snapshot(now)?;
    let json = snapshot.to_json()?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("cannot create temporary file in {}", dir.display()))?;
    tmp.write_all(json.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("cannot write ledger state {}", path.display()))?;

    tracing::debug!(path = %path.display(), hash = %snapshot.hash_hex(), "saved ledger state");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use accrue_types::{AccountId, Rate, TransferAmount};

    const RATE: Rate = Rate::new(50_000_000_000_000_000);

    fn params() -> LedgerParams {
        LedgerParams::with_initial_rate(RATE)
    }

    #[test]
    fn state_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let alice = AccountId::new("alice");

        let mut ledger = init(&path, &params(), Timestamp::new(0), false).unwrap();
        ledger.deposit(&alice, 10, None, Timestamp::new(0)).unwrap();
        save(&path, &ledger, Timestamp::new(0)).unwrap();

        let reloaded = load(&path).unwrap();
        assert_eq!(reloaded.current_balance(&alice, Timestamp::new(2)).unwrap(), 11);
        assert_eq!(reloaded.global_rate(), RATE);
    }

    #[test]
    fn init_refuses_to_clobber_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let bob = AccountId::new("bob");

        let mut ledger = init(&path, &params(), Timestamp::new(0), false).unwrap();
        ledger.deposit(&bob, 5, None, Timestamp::new(0)).unwrap();
        save(&path, &ledger, Timestamp::new(0)).unwrap();

        assert!(init(&path, &params(), Timestamp::new(0), false).is_err());
        assert_eq!(load(&path).unwrap().raw_principal(&bob).unwrap(), 5);

        init(&path, &params(), Timestamp::new(0), true).unwrap();
        assert_eq!(load(&path).unwrap().raw_principal(&bob).unwrap(), 0);
    }

    #[test]
    fn missing_state_mentions_init() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.json"))
            .err()
            .expect("loading a missing state file must fail");
        assert!(err.to_string().contains("accrue init"));
    }

    #[test]
    fn tampered_state_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let carol = AccountId::new("carol");

        let mut ledger = init(&path, &params(), Timestamp::new(0), false).unwrap();
        ledger.deposit(&carol, 100, None, Timestamp::new(0)).unwrap();
        save(&path, &ledger, Timestamp::new(0)).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, json.replace("\"principal\": 100", "\"principal\": 900")).unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn withdraw_max_persists_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let dave = AccountId::new("dave");

        let mut ledger = init(&path, &params(), Timestamp::new(0), false).unwrap();
        ledger.deposit(&dave, 100, None, Timestamp::new(0)).unwrap();
        let moved = ledger.withdraw(&dave, TransferAmount::Max, Timestamp::new(2)).unwrap();
        save(&path, &ledger, Timestamp::new(2)).unwrap();

        assert_eq!(moved, 110);
        assert_eq!(load(&path).unwrap().raw_principal(&dave).unwrap(), 0);
    }
}
