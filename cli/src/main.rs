//! `accrue`: operate an interest-accrual ledger kept in a local state file.

mod config;
mod state;

use accrue_ledger::AccountState;
use accrue_types::{AccountId, Clock, Rate, SystemClock, Timestamp, TransferAmount};
use accrue_utils::{format_duration, init_logging, LogFormat};
use clap::Parser;
use config::LedgerConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "accrue", about = "Interest-accrual balance ledger")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "ACCRUE_CONFIG")]
    config: Option<PathBuf>,

    /// Ledger state file (JSON snapshot).
    #[arg(long, env = "ACCRUE_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ACCRUE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ACCRUE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Evaluate the command at this Unix time instead of the system clock.
    #[arg(long, global = true)]
    at: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Create an empty ledger.
    Init {
        /// Starting global rate per second, e.g. "0.00000005".
        #[arg(long)]
        rate: Option<Rate>,

        /// Overwrite an existing state file.
        #[arg(long)]
        force: bool,
    },
    /// Credit an account, realizing its interest first.
    Deposit {
        account: AccountId,
        amount: u64,

        /// Rate to capture if the account is unfunded.
        #[arg(long)]
        rate: Option<Rate>,
    },
    /// Debit an account. AMOUNT may be "max".
    Withdraw {
        account: AccountId,
        amount: TransferAmount,
    },
    /// Move value between accounts. AMOUNT may be "max".
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: TransferAmount,
    },
    /// Lower the global rate.
    SetRate { rate: Rate },
    /// Show an account's balance including pending interest.
    Balance { account: AccountId },
    /// List all opened accounts.
    Accounts,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match cli.config {
        Some(ref path) => LedgerConfig::from_toml_file(path)?,
        None => LedgerConfig::default(),
    };
    let config = LedgerConfig {
        state_file: cli.state_file.unwrap_or(file_config.state_file),
        log_level: cli.log_level.unwrap_or(file_config.log_level),
        log_format: cli.log_format.unwrap_or(file_config.log_format),
        initial_rate: file_config.initial_rate,
    };

    init_logging(config.log_format, &config.log_level);
    if let Some(ref path) = cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let now = match cli.at {
        Some(secs) => Timestamp::new(secs),
        None => SystemClock.now(),
    };
    let path = config.state_file.as_path();

    match cli.command {
        Command::Init { rate, force } => {
            let mut params = config.params();
            if let Some(rate) = rate {
                params.initial_rate = rate;
            }
            let ledger = state::init(path, &params, now, force)?;
            println!(
                "initialized {} with global rate {}",
                path.display(),
                ledger.global_rate()
            );
        }
        Command::Deposit {
            account,
            amount,
            rate,
        } => {
            let mut ledger = state::load(path)?;
            ledger.deposit(&account, amount, rate, now)?;
            state::save(path, &ledger, now)?;
            println!("{account}: {}", ledger.current_balance(&account, now)?);
        }
        Command::Withdraw { account, amount } => {
            let mut ledger = state::load(path)?;
            let moved = ledger.withdraw(&account, amount, now)?;
            state::save(path, &ledger, now)?;
            println!("withdrew {moved} from {account}");
        }
        Command::Transfer { from, to, amount } => {
            let mut ledger = state::load(path)?;
            let moved = ledger.transfer(&from, &to, amount, now)?;
            state::save(path, &ledger, now)?;
            println!("moved {moved} from {from} to {to}");
        }
        Command::SetRate { rate } => {
            let mut ledger = state::load(path)?;
            let change = ledger.set_global_rate(rate, now)?;
            state::save(path, &ledger, now)?;
            println!("global rate {} -> {}", change.previous, change.new_rate);
        }
        Command::Balance { account } => {
            let ledger = state::load(path)?;
            match ledger.ledger().account_state(&account)? {
                AccountState::Unopened => println!("{account}: unopened"),
                AccountState::Active(acct) => {
                    let balance = acct.balance_at(now)?;
                    let age = acct.opened_at.elapsed_until(now).unwrap_or(0);
                    println!("{account}: {balance}");
                    println!("  principal  {}", acct.principal);
                    println!("  pending    {}", acct.pending_interest(now)?);
                    println!("  rate       {}", acct.rate);
                    println!("  open for   {}", format_duration(age));
                }
            }
        }
        Command::Accounts => {
            let ledger = state::load(path)?;
            println!("global rate {}", ledger.global_rate());
            for (id, acct) in ledger.ledger().accounts()? {
                println!(
                    "{id:<24} {:>20}  rate {}",
                    acct.balance_at(now)?,
                    acct.rate
                );
            }
        }
    }

    Ok(())
}
