//! CSV-backed group storage.
//!
//! A group lives in one directory holding `people.csv`, `expenses.csv`,
//! `payments.csv` and `outbox.csv`. Files are append-only: records are
//! validated before they are written and never rewritten afterwards.

use crate::error::{LedgerError, Result};
use crate::expense::{Expense, Payment};
use crate::ledger::GroupSnapshot;
use crate::person::Person;
use crate::record::{ExpenseRecord, OutboxRecord, PaymentRecord, PersonRecord};
use crate::split::compute_split;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

pub const PEOPLE_FILE: &str = "people.csv";
pub const EXPENSES_FILE: &str = "expenses.csv";
pub const PAYMENTS_FILE: &str = "payments.csv";
pub const OUTBOX_FILE: &str = "outbox.csv";

const FILES: [(&str, &[&str]); 4] = [
    (PEOPLE_FILE, &["id", "contact"]),
    (
        EXPENSES_FILE,
        &["id", "payer", "amount", "description", "policy", "shares"],
    ),
    (PAYMENTS_FILE, &["id", "from", "to", "amount", "note"]),
    (OUTBOX_FILE, &["recipient", "contact", "message"]),
];

/// Handle to one group's data directory.
#[derive(Debug, Clone)]
pub struct GroupStore {
    dir: PathBuf,
}

impl GroupStore {
    /// Opens a group directory, creating it and any missing file with its header.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        for (file, header) in FILES {
            let path = dir.join(file);
            if !path.exists() {
                let mut writer = WriterBuilder::new().from_path(&path)?;
                writer.write_record(header)?;
                writer.flush()?;
                debug!("Created {}", path.display());
            }
        }

        Ok(GroupStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reads every person, expense and payment in file order.
    ///
    /// Any malformed row fails the load; nothing is skipped.
    pub fn load(&self) -> Result<GroupSnapshot> {
        let people = self.read_records(PEOPLE_FILE, PersonRecord::parse)?;

        let mut seen = BTreeSet::new();
        for person in &people {
            if !seen.insert(&person.id) {
                return Err(LedgerError::DuplicatePerson {
                    person: person.id.to_string(),
                });
            }
        }

        let snapshot = GroupSnapshot {
            people,
            expenses: self.read_records(EXPENSES_FILE, ExpenseRecord::parse)?,
            payments: self.read_records(PAYMENTS_FILE, PaymentRecord::parse)?,
        };

        debug!(
            "Loaded {} people, {} expenses, {} payments from {}",
            snapshot.people.len(),
            snapshot.expenses.len(),
            snapshot.payments.len(),
            self.dir.display()
        );

        Ok(snapshot)
    }

    /// Appends a person to the roster. Ids must be unique.
    pub fn add_person(&self, person: Person) -> Result<Person> {
        let snapshot = self.load()?;
        let record = PersonRecord::from_person(&person);
        let person = record
            .parse()
            .map_err(|message| self.invalid(PEOPLE_FILE, snapshot.people.len(), message))?;

        if snapshot.people.iter().any(|p| p.id == person.id) {
            return Err(LedgerError::DuplicatePerson {
                person: person.id.to_string(),
            });
        }

        self.append(PEOPLE_FILE, &PersonRecord::from_person(&person))?;
        Ok(person)
    }

    /// Validates and appends an expense, assigning it the next `e<N>` id.
    pub fn add_expense(&self, mut expense: Expense) -> Result<Expense> {
        let snapshot = self.load()?;
        expense.id = next_id('e', snapshot.expenses.iter().map(|e| e.id.as_str()));

        let record = ExpenseRecord::from_expense(&expense);
        let expense = record
            .parse()
            .map_err(|message| self.invalid(EXPENSES_FILE, snapshot.expenses.len(), message))?;

        let context = format!("expense {}", expense.id);
        for person in std::iter::once(&expense.payer).chain(&expense.participants) {
            if !snapshot.people.iter().any(|p| &p.id == person) {
                return Err(LedgerError::unknown_person(person, context));
            }
        }
        compute_split(&expense)?;

        self.append(EXPENSES_FILE, &record)?;
        Ok(expense)
    }

    /// Validates and appends a payment, assigning it the next `p<N>` id.
    pub fn record_payment(&self, mut payment: Payment) -> Result<Payment> {
        let snapshot = self.load()?;
        payment.id = next_id('p', snapshot.payments.iter().map(|p| p.id.as_str()));

        let record = PaymentRecord::from_payment(&payment);
        let row = snapshot.payments.len();
        let payment = record
            .parse()
            .map_err(|message| self.invalid(PAYMENTS_FILE, row, message))?;

        if payment.from == payment.to {
            return Err(self.invalid(
                PAYMENTS_FILE,
                row,
                format!("{} cannot pay themselves", payment.from),
            ));
        }

        let context = format!("payment {}", payment.id);
        for person in [&payment.from, &payment.to] {
            if !snapshot.people.iter().any(|p| &p.id == person) {
                return Err(LedgerError::unknown_person(person, context));
            }
        }

        self.append(PAYMENTS_FILE, &record)?;
        Ok(payment)
    }

    /// Queues a message for an external delivery gateway.
    pub fn queue_message(&self, record: &OutboxRecord) -> Result<()> {
        self.append(OUTBOX_FILE, record)
    }

    /// Reads every queued message.
    pub fn outbox(&self) -> Result<Vec<OutboxRecord>> {
        self.read_records(OUTBOX_FILE, |record: &OutboxRecord| Ok(record.clone()))
    }

    fn read_records<R, T, F>(&self, file: &str, parse: F) -> Result<Vec<T>>
    where
        R: DeserializeOwned,
        F: Fn(&R) -> std::result::Result<T, String>,
    {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(File::open(self.dir.join(file))?);

        let mut items = Vec::new();
        for (row_idx, result) in csv_reader.deserialize::<R>().enumerate() {
            let record = result.map_err(|e| self.invalid(file, row_idx, e.to_string()))?;
            let item = parse(&record).map_err(|message| self.invalid(file, row_idx, message))?;
            items.push(item);
        }

        Ok(items)
    }

    fn append<T: Serialize>(&self, file: &str, record: &T) -> Result<()> {
        let handle = OpenOptions::new().append(true).open(self.dir.join(file))?;
        let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(handle);
        csv_writer.serialize(record)?;
        csv_writer.flush()?;
        Ok(())
    }

    /// Error for the record at zero-based data row `row_idx` of `file`.
    fn invalid(&self, file: &str, row_idx: usize, message: impl Into<String>) -> LedgerError {
        LedgerError::InvalidRecord {
            file: file.to_string(),
            // 1-indexed, accounting for header row
            row: row_idx + 2,
            message: message.into(),
        }
    }
}

/// First `<prefix><N>` id, counting from one, not already taken.
fn next_id<'a>(prefix: char, taken: impl Iterator<Item = &'a str>) -> String {
    let taken: BTreeSet<&str> = taken.collect();
    (taken.len() + 1..)
        .map(|n| format!("{}{}", prefix, n))
        .find(|id| !taken.contains(id.as_str()))
        .unwrap_or_default()
}
