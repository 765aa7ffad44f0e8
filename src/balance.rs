//! Balance aggregation: folds splits and payments into net balances.
//!
//! Balances are never stored. They are recomputed from the full fact history
//! every time, so the fold must be exact and independent of fact order.

use crate::error::{LedgerError, Result};
use crate::expense::{Payment, Split};
use crate::money::Money;
use crate::person::{Person, PersonId};
use log::debug;
use std::collections::BTreeMap;

/// Net balance per person, ordered by person id.
///
/// Positive means the group owes them, negative means they owe the group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances(BTreeMap<PersonId, Money>);

impl Balances {
    pub fn get(&self, person: &str) -> Option<Money> {
        self.0.get(person).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PersonId, Money)> {
        self.0.iter().map(|(person, balance)| (person, *balance))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every balance. Zero for any ledger built by [`compute_balances`].
    pub fn total(&self) -> Money {
        self.0.values().sum()
    }

    /// Number of people whose balance is not zero.
    pub fn unsettled(&self) -> usize {
        self.0.values().filter(|balance| !balance.is_zero()).count()
    }
}

impl FromIterator<(PersonId, Money)> for Balances {
    fn from_iter<I: IntoIterator<Item = (PersonId, Money)>>(iter: I) -> Self {
        Balances(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, Money)> for Balances {
    fn from_iter<I: IntoIterator<Item = (&'a str, Money)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(person, balance)| (PersonId::new(person), balance))
            .collect()
    }
}

/// Folds splits and payments into one net balance per roster person.
///
/// The payer of a split is credited the full amount and every participant is
/// debited their share. A payment raises the source's balance (their debt
/// shrinks) and lowers the destination's.
///
/// Fails with [`LedgerError::UnknownPerson`] if any fact references a person
/// missing from `roster`.
pub fn compute_balances(roster: &[Person], splits: &[Split], payments: &[Payment]) -> Result<Balances> {
    let mut balances: BTreeMap<PersonId, Money> = roster
        .iter()
        .map(|person| (person.id.clone(), Money::ZERO))
        .collect();

    for split in splits {
        let context = format!("expense {}", split.expense_id);
        credit(&mut balances, &split.payer, split.amount, &context)?;
        for share in &split.shares {
            debit(&mut balances, &share.person, share.amount, &context)?;
        }
        debug!(
            "Expense {}: credited {} with {}",
            split.expense_id, split.payer, split.amount
        );
    }

    for payment in payments {
        let context = format!("payment {}", payment.id);
        credit(&mut balances, &payment.from, payment.amount, &context)?;
        debit(&mut balances, &payment.to, payment.amount, &context)?;
        debug!(
            "Payment {}: {} paid {} {}",
            payment.id, payment.from, payment.to, payment.amount
        );
    }

    Ok(Balances(balances))
}

fn entry<'a>(
    balances: &'a mut BTreeMap<PersonId, Money>,
    person: &PersonId,
    context: &str,
) -> Result<&'a mut Money> {
    balances
        .get_mut(person)
        .ok_or_else(|| LedgerError::unknown_person(person, context))
}

fn credit(
    balances: &mut BTreeMap<PersonId, Money>,
    person: &PersonId,
    amount: Money,
    context: &str,
) -> Result<()> {
    let balance = entry(balances, person, context)?;
    *balance = balance.checked_add(amount).ok_or_else(|| overflow(context))?;
    Ok(())
}

fn debit(
    balances: &mut BTreeMap<PersonId, Money>,
    person: &PersonId,
    amount: Money,
    context: &str,
) -> Result<()> {
    let balance = entry(balances, person, context)?;
    *balance = balance.checked_sub(amount).ok_or_else(|| overflow(context))?;
    Ok(())
}

fn overflow(context: &str) -> LedgerError {
    LedgerError::AmountOverflow {
        context: context.to_string(),
    }
}

/// Creditors, debtors and settled members of a group at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub creditors: Vec<(PersonId, Money)>,
    pub debtors: Vec<(PersonId, Money)>,
    pub settled: Vec<PersonId>,

    /// Sum of what debtors owe, as a positive amount.
    pub total_owed: Money,

    /// Sum of what creditors are owed.
    pub total_due: Money,
}

impl GroupSummary {
    pub fn from_balances(balances: &Balances) -> Self {
        let mut summary = GroupSummary {
            creditors: Vec::new(),
            debtors: Vec::new(),
            settled: Vec::new(),
            total_owed: Money::ZERO,
            total_due: Money::ZERO,
        };

        for (person, balance) in balances.iter() {
            if balance.is_positive() {
                summary.total_due += balance;
                summary.creditors.push((person.clone(), balance));
            } else if balance.is_negative() {
                summary.total_owed += balance.abs();
                summary.debtors.push((person.clone(), balance));
            } else {
                summary.settled.push(person.clone());
            }
        }

        summary
    }

    pub fn is_balanced(&self) -> bool {
        self.total_owed == self.total_due
    }
}
