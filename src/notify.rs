//! Notification strategies for balance and settlement summaries.
//!
//! The ledger never calls a notifier itself. Callers render messages from a
//! [`GroupLedger`] and hand them to whichever [`Notifier`] the configuration
//! selected.

use crate::error::Result;
use crate::ledger::GroupLedger;
use crate::money::Money;
use crate::person::{Person, PersonId};
use crate::record::OutboxRecord;
use crate::settlement::SettlementPlan;
use crate::store::GroupStore;
use log::{debug, warn};
use std::io::Write;

/// Delivers a rendered message to one person.
pub trait Notifier {
    /// Returns `true` if the message was handed off, `false` if skipped.
    fn send(&mut self, recipient: &Person, message: &str) -> Result<bool>;
}

/// Dry-run notifier that prints messages instead of delivering them.
pub struct ConsoleNotifier<W: Write> {
    out: W,
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        ConsoleNotifier { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    fn send(&mut self, recipient: &Person, message: &str) -> Result<bool> {
        writeln!(self.out, "[DRY RUN] message to {}:", recipient.id)?;
        for line in message.lines() {
            writeln!(self.out, "  {}", line)?;
        }
        Ok(true)
    }
}

/// Queues messages in the group's outbox for an external SMS gateway.
///
/// People without a contact address cannot be reached and are skipped.
pub struct OutboxNotifier<'a> {
    store: &'a GroupStore,
}

impl<'a> OutboxNotifier<'a> {
    pub fn new(store: &'a GroupStore) -> Self {
        OutboxNotifier { store }
    }
}

impl Notifier for OutboxNotifier<'_> {
    fn send(&mut self, recipient: &Person, message: &str) -> Result<bool> {
        let Some(contact) = recipient.contact.as_deref() else {
            warn!("Skipping {}: no contact address", recipient.id);
            return Ok(false);
        };

        self.store.queue_message(&OutboxRecord {
            recipient: recipient.id.to_string(),
            contact: contact.to_string(),
            message: message.to_string(),
        })?;
        debug!("Queued message for {} at {}", recipient.id, contact);
        Ok(true)
    }
}

/// Renders one person's balance update.
pub fn balance_message(person: &PersonId, balance: Money) -> String {
    let status = if balance.is_positive() {
        format!("you are owed {}", balance)
    } else if balance.is_negative() {
        format!("you owe {}", balance.abs())
    } else {
        "you are settled up".to_string()
    };
    format!("Balance update for {}: {}", person, status)
}

/// Renders the transfers one person pays or receives under `plan`.
pub fn settlement_message(person: &PersonId, plan: &SettlementPlan) -> String {
    let mut message = format!("Settlement suggestions for {}:", person);
    let mut any = false;

    for transfer in plan.involving(person.as_str()) {
        any = true;
        if &transfer.from == person {
            message.push_str(&format!("\nPay {}: {}", transfer.to, transfer.amount));
        } else {
            message.push_str(&format!("\nReceive from {}: {}", transfer.from, transfer.amount));
        }
    }
    if !any {
        message.push_str("\nNo transfers needed");
    }

    message
}

/// Sends every roster member their balance. Returns how many were sent.
pub fn notify_balances<N: Notifier + ?Sized>(ledger: &GroupLedger, notifier: &mut N) -> Result<usize> {
    let balances = ledger.balances()?;
    let mut sent = 0;

    for person in ledger.people() {
        let balance = balances.get(person.id.as_str()).unwrap_or(Money::ZERO);
        if notifier.send(person, &balance_message(&person.id, balance))? {
            sent += 1;
        }
    }

    Ok(sent)
}

/// Sends every roster member their part of the settlement plan.
pub fn notify_settlements<N: Notifier + ?Sized>(
    ledger: &GroupLedger,
    notifier: &mut N,
) -> Result<usize> {
    let plan = ledger.settlement_plan()?;
    let mut sent = 0;

    for person in ledger.people() {
        if notifier.send(person, &settlement_message(&person.id, &plan))? {
            sent += 1;
        }
    }

    Ok(sent)
}
