//! Group ledger: runs the split, balance and settlement stages over one
//! snapshot of a group's facts and writes the results as CSV.

use crate::balance::{compute_balances, Balances, GroupSummary};
use crate::error::Result;
use crate::expense::{Expense, Payment, Split};
use crate::person::Person;
use crate::settlement::{suggest_settlements, SettlementPlan, SettlementStats};
use crate::split::compute_split;
use csv::Writer;
use log::debug;
use std::io::Write;

/// Everything recorded for one group, in recording order.
#[derive(Debug, Clone, Default)]
pub struct GroupSnapshot {
    pub people: Vec<Person>,
    pub expenses: Vec<Expense>,
    pub payments: Vec<Payment>,
}

/// A group's resolved fact history.
///
/// Every expense is resolved to a split up front; a single invalid expense
/// fails the whole ledger. Balances and plans are recomputed on each call.
///
/// # Output Ordering
///
/// Balances are written sorted by person id; plans are written in the order
/// the optimizer produced them.
#[derive(Debug, Clone)]
pub struct GroupLedger {
    people: Vec<Person>,
    splits: Vec<Split>,
    payments: Vec<Payment>,
}

impl GroupLedger {
    /// Resolves every expense in the snapshot.
    pub fn new(snapshot: GroupSnapshot) -> Result<Self> {
        let splits = snapshot
            .expenses
            .iter()
            .map(compute_split)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Loaded ledger with {} people, {} expenses, {} payments",
            snapshot.people.len(),
            splits.len(),
            snapshot.payments.len()
        );

        Ok(GroupLedger {
            people: snapshot.people,
            splits,
            payments: snapshot.payments,
        })
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    pub fn balances(&self) -> Result<Balances> {
        compute_balances(&self.people, &self.splits, &self.payments)
    }

    pub fn settlement_plan(&self) -> Result<SettlementPlan> {
        suggest_settlements(&self.balances()?)
    }

    pub fn summary(&self) -> Result<GroupSummary> {
        Ok(GroupSummary::from_balances(&self.balances()?))
    }

    pub fn stats(&self) -> Result<SettlementStats> {
        let balances = self.balances()?;
        let plan = suggest_settlements(&balances)?;
        Ok(SettlementStats::new(&balances, &plan))
    }

    /// Writes `person,balance` rows sorted by person id.
    pub fn write_balances<W: Write>(&self, writer: W) -> Result<()> {
        let balances = self.balances()?;
        let mut csv_writer = Writer::from_writer(writer);
        csv_writer.write_record(["person", "balance"])?;

        for (person, balance) in balances.iter() {
            csv_writer.write_record([person.as_str(), balance.to_string().as_str()])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Writes `from,to,amount` rows in plan order.
    pub fn write_plan<W: Write>(&self, writer: W) -> Result<()> {
        let plan = self.settlement_plan()?;
        let mut csv_writer = Writer::from_writer(writer);
        csv_writer.write_record(["from", "to", "amount"])?;

        for transfer in &plan {
            csv_writer.write_record([
                transfer.from.to_string(),
                transfer.to.to_string(),
                transfer.amount.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Writes a human-readable summary of expenses, balances and the suggested plan.
    pub fn write_summary<W: Write>(&self, mut writer: W) -> Result<()> {
        let summary = self.summary()?;
        let stats = self.stats()?;

        for split in &self.splits {
            let shares: Vec<String> = split
                .shares
                .iter()
                .map(|share| format!("{} {}", share.person, share.amount))
                .collect();
            writeln!(
                writer,
                "{}: {} paid {} ({})",
                split.expense_id,
                split.payer,
                split.amount,
                shares.join(", ")
            )?;
        }
        for (person, balance) in &summary.creditors {
            writeln!(writer, "{}: +{} (owed to them)", person, balance)?;
        }
        for (person, balance) in &summary.debtors {
            writeln!(writer, "{}: -{} (owes)", person, balance.abs())?;
        }
        for person in &summary.settled {
            writeln!(writer, "{}: 0.00 (even)", person)?;
        }
        writeln!(
            writer,
            "Total owed: {}, total due: {}",
            summary.total_owed, summary.total_due
        )?;
        writeln!(
            writer,
            "{} transfers settle {} across {} people ({:.2} transfers per person)",
            stats.transfer_count,
            stats.total_debt,
            stats.unsettled_parties,
            stats.efficiency()
        )?;

        Ok(())
    }
}
