//! Split calculator: turns one expense into per-participant owed amounts.
//!
//! All arithmetic is done in integer minor units. Shares that do not divide
//! evenly are rounded down and the residue is handed out one minor unit at a
//! time, in participant-list order, to the participants whose share was
//! rounded down. The result always sums to the expense amount exactly.

use crate::error::{LedgerError, Result};
use crate::expense::{Expense, Share, Split, SplitPolicy};
use crate::money::Money;
use crate::person::PersonId;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Resolves an expense into a [`Split`].
///
/// Fails with [`LedgerError::InvalidSplit`] if the amount is not positive,
/// the participant list is empty or has duplicates, or the policy parameters
/// are missing, negative, name a non-participant, or do not add up.
pub fn compute_split(expense: &Expense) -> Result<Split> {
    let id = expense.id.as_str();

    if !expense.amount.is_positive() {
        return Err(LedgerError::invalid_split(
            id,
            format!("amount {} must be positive", expense.amount),
        ));
    }
    if !expense.amount.is_within_limit() {
        return Err(LedgerError::invalid_split(
            id,
            format!("amount {} exceeds the maximum of {}", expense.amount, Money::max()),
        ));
    }
    if expense.participants.is_empty() {
        return Err(LedgerError::invalid_split(id, "no participants"));
    }

    let mut seen = BTreeSet::new();
    for person in &expense.participants {
        if !seen.insert(person) {
            return Err(LedgerError::invalid_split(
                id,
                format!("participant {} listed more than once", person),
            ));
        }
    }

    let owed = match &expense.policy {
        SplitPolicy::Equal => {
            let weights = vec![1; expense.participants.len()];
            distribute(expense.amount.minor_units(), &weights)
        }
        SplitPolicy::Exact(amounts) => exact_shares(expense, amounts)?,
        SplitPolicy::Percent(percents) => {
            let percents = params_in_order(expense, percents)?;
            if let Some(negative) = percents.iter().find(|p| p.is_negative()) {
                return Err(LedgerError::invalid_split(
                    id,
                    format!("percentage {}% is negative", negative),
                ));
            }
            let total: i128 = percents.iter().map(|p| p.hundredths()).sum();
            if total != 100_00 {
                return Err(LedgerError::invalid_split(
                    id,
                    format!(
                        "percentages sum to {}%, expected 100%",
                        Money::from_minor(total)
                    ),
                ));
            }
            let weights: Vec<i128> = percents.iter().map(|p| p.hundredths()).collect();
            distribute(expense.amount.minor_units(), &weights)
        }
    };

    let shares: Vec<Share> = expense
        .participants
        .iter()
        .zip(owed)
        .map(|(person, units)| Share {
            person: person.clone(),
            amount: Money::from_minor(units),
        })
        .collect();

    debug!(
        "Expense {}: {} {} split across {} participants",
        id,
        expense.policy.kind(),
        expense.amount,
        shares.len()
    );

    Ok(Split {
        expense_id: expense.id.clone(),
        payer: expense.payer.clone(),
        amount: expense.amount,
        shares,
    })
}

fn exact_shares(expense: &Expense, amounts: &BTreeMap<PersonId, Money>) -> Result<Vec<i128>> {
    let id = expense.id.as_str();
    let amounts = params_in_order(expense, amounts)?;

    if let Some(negative) = amounts.iter().find(|a| a.is_negative()) {
        return Err(LedgerError::invalid_split(
            id,
            format!("amount {} is negative", negative),
        ));
    }

    if let Some(huge) = amounts.iter().find(|a| !a.is_within_limit()) {
        return Err(LedgerError::invalid_split(
            id,
            format!("amount {} exceeds the maximum of {}", huge, Money::max()),
        ));
    }

    let total: Money = amounts.iter().sum();
    if total != expense.amount {
        return Err(LedgerError::invalid_split(
            id,
            format!("amounts sum to {}, expected {}", total, expense.amount),
        ));
    }

    Ok(amounts.iter().map(Money::minor_units).collect())
}

/// Looks up one parameter per participant, in participant order.
fn params_in_order<V: Copy>(expense: &Expense, params: &BTreeMap<PersonId, V>) -> Result<Vec<V>> {
    let id = expense.id.as_str();

    if let Some(stranger) = params
        .keys()
        .find(|person| !expense.participants.contains(person))
    {
        return Err(LedgerError::invalid_split(
            id,
            format!("{} has a share but is not a participant", stranger),
        ));
    }

    expense
        .participants
        .iter()
        .map(|person| {
            params.get(person).copied().ok_or_else(|| {
                LedgerError::invalid_split(id, format!("no share given for participant {}", person))
            })
        })
        .collect()
}

/// Divides `total` minor units proportionally to `weights`.
///
/// Each share is `floor(total * weight / sum(weights))`. The residue is
/// strictly smaller than the number of shares that were rounded down, so
/// handing one unit to each of the first `residue` of them in order never
/// pushes a share past its exact value rounded up.
fn distribute(total: i128, weights: &[i128]) -> Vec<i128> {
    let weight_sum: i128 = weights.iter().sum();
    if weight_sum == 0 {
        return vec![0; weights.len()];
    }

    let mut shares = Vec::with_capacity(weights.len());
    let mut rounded_down = Vec::new();
    for (idx, weight) in weights.iter().enumerate() {
        let scaled = total * weight;
        shares.push(scaled / weight_sum);
        if scaled % weight_sum != 0 {
            rounded_down.push(idx);
        }
    }

    let residue = total - shares.iter().sum::<i128>();
    for idx in rounded_down.into_iter().take(residue as usize) {
        shares[idx] += 1;
    }

    shares
}
