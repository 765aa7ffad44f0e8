//! Split Ledger CLI
//!
//! Records people, expenses and payments for one group directory and prints
//! balances and suggested settlements as CSV.
//!
//! # Usage
//!
//! ```bash
//! split-ledger --data-dir flat add-person alice --contact +15550100
//! split-ledger --data-dir flat add-expense --paid-by alice --amount 60 --desc Groceries --shares alice,bob,charlie
//! split-ledger --data-dir flat settle > plan.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `SPLIT_LEDGER_DATA_DIR`: Group directory (default `data`)
//! - `SPLIT_LEDGER_NOTIFY`: `dry-run` (default) or `outbox`

use clap::{Parser, Subcommand, ValueEnum};
use split_ledger::config::DEFAULT_DATA_DIR;
use split_ledger::record::parse_shares;
use split_ledger::{
    notify_balances, notify_settlements, Expense, GroupLedger, LedgerError, Money, NotifyMode,
    Payment, Person, PersonId, Result, Settings, SplitKind,
};
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "split-ledger")]
#[command(about = "Split shared expenses and settle up with as few transfers as possible")]
struct Cli {
    /// Group directory holding people, expenses and payments.
    #[arg(long, env = "SPLIT_LEDGER_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// How `notify` delivers messages.
    #[arg(long, env = "SPLIT_LEDGER_NOTIFY", value_enum, default_value_t = NotifyMode::DryRun)]
    notify_mode: NotifyMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a person to the group roster.
    AddPerson {
        id: String,
        /// Phone number used by the outbox notifier.
        #[arg(long)]
        contact: Option<String>,
    },

    /// Record an expense paid by one person.
    AddExpense {
        #[arg(long)]
        paid_by: String,
        #[arg(long)]
        amount: Money,
        #[arg(long, default_value = "")]
        desc: String,
        #[arg(long, value_enum, default_value_t = SplitKind::Equal)]
        split: SplitKind,
        /// Participants: `a,b` for equal, `a=10.00,b=5.00` for exact, `a=60,b=40` for percent.
        #[arg(long)]
        shares: String,
    },

    /// Record a payment made outside the suggested plan.
    RecordPayment {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Money,
        #[arg(long)]
        note: Option<String>,
    },

    /// Print net balances as CSV.
    Balances,

    /// Print the suggested settlement plan as CSV.
    Settle,

    /// Print a readable summary of balances and the plan.
    Summary,

    /// Send every member their balance or settlement suggestions.
    Notify {
        #[arg(long, value_enum)]
        what: Topic,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Topic {
    Balances,
    Settlements,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings {
        data_dir: cli.data_dir,
        notify_mode: cli.notify_mode,
    };
    let store = settings.open_store()?;

    match cli.command {
        Command::AddPerson { id, contact } => {
            let person = store.add_person(Person {
                id: PersonId::new(id),
                contact,
            })?;
            println!("Added {}", person.id);
        }
        Command::AddExpense {
            paid_by,
            amount,
            desc,
            split,
            shares,
        } => {
            let (participants, policy) =
                parse_shares(split, &shares).map_err(|reason| LedgerError::InvalidSplit {
                    expense: "new expense".to_string(),
                    reason,
                })?;
            let expense = store.add_expense(Expense {
                id: String::new(),
                payer: PersonId::new(paid_by),
                amount,
                description: desc,
                participants,
                policy,
            })?;
            println!("Added expense {}: {} paid by {}", expense.id, expense.amount, expense.payer);
        }
        Command::RecordPayment {
            from,
            to,
            amount,
            note,
        } => {
            let mut payment = Payment::new("", &from, &to, amount);
            payment.note = note;
            let payment = store.record_payment(payment)?;
            println!(
                "Recorded payment {}: {} paid {} {}",
                payment.id, payment.from, payment.to, payment.amount
            );
        }
        Command::Balances => {
            let ledger = GroupLedger::new(store.load()?)?;
            ledger.write_balances(io::stdout().lock())?;
        }
        Command::Settle => {
            let ledger = GroupLedger::new(store.load()?)?;
            ledger.write_plan(io::stdout().lock())?;
        }
        Command::Summary => {
            let ledger = GroupLedger::new(store.load()?)?;
            ledger.write_summary(io::stdout().lock())?;
        }
        Command::Notify { what } => {
            let ledger = GroupLedger::new(store.load()?)?;
            let mut notifier = settings.notifier(&store);
            let sent = match what {
                Topic::Balances => notify_balances(&ledger, notifier.as_mut())?,
                Topic::Settlements => notify_settlements(&ledger, notifier.as_mut())?,
            };
            println!("Sent {} of {} notifications", sent, ledger.people().len());
        }
    }

    Ok(())
}
