//! Expense and payment facts, and the resolved split of an expense.
//!
//! Expenses and payments are append-only: once created they are never
//! mutated. Everything else is recomputed from them.

use crate::money::{Money, Percent};
use crate::person::PersonId;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Rule determining how one expense's amount is divided among participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SplitKind {
    Equal,
    Exact,
    Percent,
}

impl SplitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitKind::Equal => "equal",
            SplitKind::Exact => "exact",
            SplitKind::Percent => "percent",
        }
    }
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equal" => Ok(SplitKind::Equal),
            "exact" => Ok(SplitKind::Exact),
            "percent" => Ok(SplitKind::Percent),
            other => Err(format!("unknown split policy '{}'", other)),
        }
    }
}

/// Split policy with its policy-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Amount divided evenly; no parameters.
    Equal,

    /// One explicit amount per participant.
    Exact(BTreeMap<PersonId, Money>),

    /// One percentage per participant.
    Percent(BTreeMap<PersonId, Percent>),
}

impl SplitPolicy {
    pub fn kind(&self) -> SplitKind {
        match self {
            SplitPolicy::Equal => SplitKind::Equal,
            SplitPolicy::Exact(_) => SplitKind::Exact,
            SplitPolicy::Percent(_) => SplitKind::Percent,
        }
    }
}

/// A shared expense paid by one person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    pub id: String,

    pub payer: PersonId,

    /// Total paid. Must be positive.
    pub amount: Money,

    pub description: String,

    /// People sharing the expense, in the order used for residue assignment.
    /// The payer need not be listed.
    pub participants: Vec<PersonId>,

    pub policy: SplitPolicy,
}

impl Expense {
    /// Creates an equally split expense.
    pub fn equal<I, P>(id: &str, payer: &str, amount: Money, participants: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PersonId>,
    {
        Expense {
            id: id.to_string(),
            payer: PersonId::new(payer),
            amount,
            description: String::new(),
            participants: participants.into_iter().map(Into::into).collect(),
            policy: SplitPolicy::Equal,
        }
    }

    /// Creates an expense split by explicit per-participant amounts.
    ///
    /// Participants are taken in the order given.
    pub fn exact<I, P>(id: &str, payer: &str, amount: Money, shares: I) -> Self
    where
        I: IntoIterator<Item = (P, Money)>,
        P: Into<PersonId>,
    {
        let (participants, amounts) = unzip_params(shares);
        Expense {
            id: id.to_string(),
            payer: PersonId::new(payer),
            amount,
            description: String::new(),
            participants,
            policy: SplitPolicy::Exact(amounts),
        }
    }

    /// Creates an expense split by per-participant percentages.
    ///
    /// Participants are taken in the order given.
    pub fn percent<I, P>(id: &str, payer: &str, amount: Money, shares: I) -> Self
    where
        I: IntoIterator<Item = (P, Percent)>,
        P: Into<PersonId>,
    {
        let (participants, percents) = unzip_params(shares);
        Expense {
            id: id.to_string(),
            payer: PersonId::new(payer),
            amount,
            description: String::new(),
            participants,
            policy: SplitPolicy::Percent(percents),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

fn unzip_params<I, P, V>(shares: I) -> (Vec<PersonId>, BTreeMap<PersonId, V>)
where
    I: IntoIterator<Item = (P, V)>,
    P: Into<PersonId>,
{
    let mut participants = Vec::new();
    let mut params = BTreeMap::new();
    for (person, value) in shares {
        let person = person.into();
        participants.push(person.clone());
        params.insert(person, value);
    }
    (participants, params)
}

/// One participant's owed amount within a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub person: PersonId,
    pub amount: Money,
}

/// Resolved output of one expense.
///
/// # Invariants
///
/// - Share amounts sum to `amount` exactly
/// - Every share amount is non-negative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub expense_id: String,
    pub payer: PersonId,
    pub amount: Money,

    /// Shares in participant order.
    pub shares: Vec<Share>,
}

impl Split {
    /// Returns the amount owed by `person`, if they participate.
    pub fn share_of(&self, person: &str) -> Option<Money> {
        self.shares
            .iter()
            .find(|share| share.person.as_str() == person)
            .map(|share| share.amount)
    }

    pub fn total(&self) -> Money {
        self.shares.iter().map(|share| share.amount).sum()
    }
}

/// A settlement transfer already executed outside the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: String,
    pub from: PersonId,
    pub to: PersonId,

    /// Amount transferred. Must be positive.
    pub amount: Money,

    pub note: Option<String>,
}

impl Payment {
    pub fn new(id: &str, from: &str, to: &str, amount: Money) -> Self {
        Payment {
            id: id.to_string(),
            from: PersonId::new(from),
            to: PersonId::new(to),
            amount,
            note: None,
        }
    }
}
