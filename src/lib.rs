//! # Split Ledger
//!
//! Tracks shared expenses within a group, computes each person's net balance
//! and suggests a short list of transfers that settles everyone up.
//!
//! ## Design Principles
//!
//! - **Exact arithmetic**: every amount is a whole number of cents via `rust_decimal`
//! - **Append-only facts**: expenses and payments are never edited; balances
//!   are always recomputed from the full history
//! - **Strict invariants**: splits sum to the expense, balances sum to zero
//! - **Deterministic output**: residues go in participant order, ties in id order
//!
//! ## Example
//!
//! ```
//! use split_ledger::{compute_balances, compute_split, suggest_settlements, Expense, Money, Person};
//! use std::str::FromStr;
//!
//! let people: Vec<Person> = ["alice", "bob", "charlie"].into_iter().map(Person::new).collect();
//! let dinner = Expense::equal("e1", "alice", Money::from_str("60.00").unwrap(), ["alice", "bob", "charlie"]);
//!
//! let split = compute_split(&dinner).unwrap();
//! let balances = compute_balances(&people, &[split], &[]).unwrap();
//! let plan = suggest_settlements(&balances).unwrap();
//!
//! assert_eq!(plan.len(), 2);
//! assert_eq!(plan.transfers()[0].to_string(), "bob -> alice: 20.00");
//! ```

pub mod balance;
pub mod config;
pub mod error;
pub mod expense;
pub mod ledger;
pub mod money;
pub mod notify;
pub mod person;
pub mod record;
pub mod settlement;
pub mod split;
pub mod store;

pub use balance::{compute_balances, Balances, GroupSummary};
pub use config::{NotifyMode, Settings};
pub use error::{LedgerError, Result};
pub use expense::{Expense, Payment, Share, Split, SplitKind, SplitPolicy};
pub use ledger::{GroupLedger, GroupSnapshot};
pub use money::{Money, ParseAmountError, Percent};
pub use notify::{notify_balances, notify_settlements, ConsoleNotifier, Notifier, OutboxNotifier};
pub use person::{Person, PersonId};
pub use settlement::{suggest_settlements, SettlementPlan, SettlementStats, Transfer};
pub use split::compute_split;
pub use store::GroupStore;
