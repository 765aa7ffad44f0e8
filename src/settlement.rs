//! Settlement optimizer: turns net balances into a short transfer plan.
//!
//! Greedy largest-to-largest pairing. Each step settles at least one party
//! in full, so `n` unsettled parties need at most `n - 1` transfers. Ties
//! between equal remainders go to the lexically smaller person id.

use crate::balance::Balances;
use crate::error::{LedgerError, Result};
use crate::money::Money;
use crate::person::PersonId;
use log::debug;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

/// One suggested transfer from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub from: PersonId,
    pub to: PersonId,

    /// Always positive.
    pub amount: Money,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.amount)
    }
}

/// Ordered transfers that bring every balance to zero when executed.
///
/// Advisory only: recording the matching payments is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementPlan {
    transfers: Vec<Transfer>,
}

impl SettlementPlan {
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transfer> {
        self.transfers.iter()
    }

    /// Transfers paid or received by `person`, in plan order.
    pub fn involving<'a>(&'a self, person: &'a str) -> impl Iterator<Item = &'a Transfer> + 'a {
        self.transfers
            .iter()
            .filter(move |t| t.from.as_str() == person || t.to.as_str() == person)
    }

    /// Sum of all transfer amounts.
    pub fn total(&self) -> Money {
        self.transfers.iter().map(|t| t.amount).sum()
    }
}

impl<'a> IntoIterator for &'a SettlementPlan {
    type Item = &'a Transfer;
    type IntoIter = std::slice::Iter<'a, Transfer>;

    fn into_iter(self) -> Self::IntoIter {
        self.transfers.iter()
    }
}

/// A creditor or debtor with the absolute amount still to settle.
///
/// Heap order: larger remainder first, then smaller id first.
#[derive(Debug, PartialEq, Eq)]
struct Party {
    remaining: Money,
    id: PersonId,
}

impl Ord for Party {
    fn cmp(&self, other: &Self) -> Ordering {
        self.remaining
            .cmp(&other.remaining)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Party {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Suggests transfers that zero out `balances`.
///
/// Fails with [`LedgerError::UnbalancedLedger`] if the balances do not sum
/// to zero, since no plan could settle them.
pub fn suggest_settlements(balances: &Balances) -> Result<SettlementPlan> {
    let total = balances
        .iter()
        .try_fold(Money::ZERO, |sum, (_, balance)| sum.checked_add(balance))
        .ok_or_else(|| LedgerError::AmountOverflow {
            context: "settlement totals".to_string(),
        })?;
    if !total.is_zero() {
        return Err(LedgerError::UnbalancedLedger {
            total: total.to_string(),
        });
    }

    let mut creditors = BinaryHeap::new();
    let mut debtors = BinaryHeap::new();
    for (person, balance) in balances.iter() {
        let party = Party {
            remaining: balance.abs(),
            id: person.clone(),
        };
        if balance.is_positive() {
            creditors.push(party);
        } else if balance.is_negative() {
            debtors.push(party);
        }
    }

    let mut transfers = Vec::new();
    while let (Some(mut creditor), Some(mut debtor)) = (creditors.pop(), debtors.pop()) {
        let amount = creditor.remaining.min(debtor.remaining);
        creditor.remaining -= amount;
        debtor.remaining -= amount;

        debug!("Transfer {} from {} to {}", amount, debtor.id, creditor.id);
        transfers.push(Transfer {
            from: debtor.id.clone(),
            to: creditor.id.clone(),
            amount,
        });

        if !creditor.remaining.is_zero() {
            creditors.push(creditor);
        }
        if !debtor.remaining.is_zero() {
            debtors.push(debtor);
        }
    }

    debug_assert!(creditors.is_empty() && debtors.is_empty());

    Ok(SettlementPlan { transfers })
}

/// Figures describing how much a plan moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementStats {
    /// Sum of all negative balances, as a positive amount.
    pub total_debt: Money,
    pub transfer_count: usize,
    pub total_transferred: Money,
    pub unsettled_parties: usize,
}

impl SettlementStats {
    pub fn new(balances: &Balances, plan: &SettlementPlan) -> Self {
        SettlementStats {
            total_debt: balances
                .iter()
                .filter(|(_, balance)| balance.is_negative())
                .map(|(_, balance)| balance.abs())
                .sum(),
            transfer_count: plan.len(),
            total_transferred: plan.total(),
            unsettled_parties: balances.unsettled(),
        }
    }

    /// Transfers per unsettled party. Zero when everyone is even.
    pub fn efficiency(&self) -> f64 {
        if self.unsettled_parties == 0 {
            return 0.0;
        }
        self.transfer_count as f64 / self.unsettled_parties as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    fn balances(entries: &[(&str, &str)]) -> Balances {
        entries
            .iter()
            .map(|(person, amount)| (*person, money(amount)))
            .collect()
    }

    fn triples(plan: &SettlementPlan) -> Vec<(String, String, String)> {
        plan.iter()
            .map(|t| (t.from.to_string(), t.to.to_string(), t.amount.to_string()))
            .collect()
    }

    fn t(from: &str, to: &str, amount: &str) -> (String, String, String) {
        (from.to_string(), to.to_string(), amount.to_string())
    }

    #[test]
    fn test_simple_two_person() {
        let plan = suggest_settlements(&balances(&[("alice", "20.00"), ("bob", "-20.00")])).unwrap();
        assert_eq!(triples(&plan), vec![t("bob", "alice", "20.00")]);
    }

    #[test]
    fn test_one_creditor_two_debtors_ties_break_lexically() {
        let plan = suggest_settlements(&balances(&[
            ("charlie", "-20.00"),
            ("alice", "40.00"),
            ("bob", "-20.00"),
        ]))
        .unwrap();

        assert_eq!(
            triples(&plan),
            vec![t("bob", "alice", "20.00"), t("charlie", "alice", "20.00")]
        );
    }

    #[test]
    fn test_largest_pairs_first() {
        let plan = suggest_settlements(&balances(&[
            ("u1", "50.00"),
            ("u2", "30.00"),
            ("u3", "-40.00"),
            ("u4", "-40.00"),
        ]))
        .unwrap();

        assert_eq!(
            triples(&plan),
            vec![
                t("u3", "u1", "40.00"),
                t("u4", "u2", "30.00"),
                t("u4", "u1", "10.00"),
            ]
        );
        assert_eq!(plan.total(), money("80.00"));
    }

    #[test]
    fn test_exact_match_settles_both_parties() {
        let plan = suggest_settlements(&balances(&[
            ("a", "30.00"),
            ("b", "10.00"),
            ("c", "-30.00"),
            ("d", "-10.00"),
        ]))
        .unwrap();

        assert_eq!(
            triples(&plan),
            vec![t("c", "a", "30.00"), t("d", "b", "10.00")]
        );
    }

    #[test]
    fn test_all_even_needs_no_transfers() {
        let plan = suggest_settlements(&balances(&[("alice", "0.00"), ("bob", "0")])).unwrap();
        assert!(plan.is_empty());

        let plan = suggest_settlements(&Balances::default()).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_unbalanced_input_fails() {
        match suggest_settlements(&balances(&[("alice", "20.00"), ("bob", "-19.99")])) {
            Err(LedgerError::UnbalancedLedger { total }) => assert_eq!(total, "0.01"),
            other => panic!("Expected UnbalancedLedger, got {:?}", other),
        }
    }

    #[test]
    fn test_involving_filters_by_person() {
        let plan = suggest_settlements(&balances(&[
            ("alice", "40.00"),
            ("bob", "-20.00"),
            ("charlie", "-20.00"),
        ]))
        .unwrap();

        assert_eq!(plan.involving("alice").count(), 2);
        assert_eq!(plan.involving("bob").count(), 1);
        assert_eq!(plan.involving("dave").count(), 0);
    }

    #[test]
    fn test_stats() {
        let input = balances(&[
            ("alice", "30.00"),
            ("bob", "-20.00"),
            ("charlie", "-10.00"),
            ("dave", "0.00"),
        ]);
        let plan = suggest_settlements(&input).unwrap();
        let stats = SettlementStats::new(&input, &plan);

        assert_eq!(stats.total_debt, money("30.00"));
        assert_eq!(stats.transfer_count, 2);
        assert_eq!(stats.total_transferred, money("30.00"));
        assert_eq!(stats.unsettled_parties, 3);
        assert!((stats.efficiency() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_when_everyone_is_even() {
        let input = balances(&[("alice", "0.00"), ("bob", "0.00")]);
        let plan = suggest_settlements(&input).unwrap();
        let stats = SettlementStats::new(&input, &plan);

        assert_eq!(stats.transfer_count, 0);
        assert_eq!(stats.unsettled_parties, 0);
        assert_eq!(stats.efficiency(), 0.0);
    }

    #[test]
    fn test_transfer_display() {
        let transfer = Transfer {
            from: PersonId::from("bob"),
            to: PersonId::from("alice"),
            amount: money("20"),
        };
        assert_eq!(transfer.to_string(), "bob -> alice: 20.00");
    }
}
