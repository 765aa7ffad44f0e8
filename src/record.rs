//! Record models for the group CSV files and conversion to typed facts.

use crate::expense::{Expense, Payment, SplitKind, SplitPolicy};
use crate::money::{Money, Percent};
use crate::person::{Person, PersonId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Row of `people.csv`.
#[derive(Debug, Deserialize, Serialize)]
pub struct PersonRecord {
    pub id: String,

    /// Empty when the person has no contact address.
    pub contact: Option<String>,
}

impl PersonRecord {
    pub fn parse(&self) -> Result<Person, String> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err("person id is empty".to_string());
        }
        if let Some(reserved) = id.chars().find(|c| SHARE_DELIMITERS.contains(c)) {
            return Err(format!("person id '{}' must not contain '{}'", id, reserved));
        }

        Ok(Person {
            id: PersonId::new(id),
            contact: non_empty(&self.contact),
        })
    }

    pub fn from_person(person: &Person) -> Self {
        PersonRecord {
            id: person.id.to_string(),
            contact: person.contact.clone(),
        }
    }
}

/// Row of `expenses.csv`.
///
/// The `shares` column lists participants separated by `;` (or `,`), with a
/// `=value` suffix for exact amounts or percentages:
///
/// - equal: `alice;bob;charlie`
/// - exact: `alice=30.00;bob=30.00`
/// - percent: `alice=60;bob=40`
#[derive(Debug, Deserialize, Serialize)]
pub struct ExpenseRecord {
    pub id: String,
    pub payer: String,
    pub amount: String,
    pub description: String,
    pub policy: String,
    pub shares: String,
}

impl ExpenseRecord {
    /// Parses the raw record into a typed expense.
    ///
    /// Only the encoding is checked here; split constraints are enforced by
    /// the split calculator.
    pub fn parse(&self) -> Result<Expense, String> {
        let payer = self.payer.trim();
        if payer.is_empty() {
            return Err("payer is empty".to_string());
        }

        let amount = Money::from_str(&self.amount).map_err(|e| e.to_string())?;
        let kind = SplitKind::from_str(&self.policy)?;
        let (participants, policy) = parse_shares(kind, &self.shares)?;

        Ok(Expense {
            id: self.id.trim().to_string(),
            payer: PersonId::new(payer),
            amount,
            description: self.description.clone(),
            participants,
            policy,
        })
    }

    pub fn from_expense(expense: &Expense) -> Self {
        ExpenseRecord {
            id: expense.id.clone(),
            payer: expense.payer.to_string(),
            amount: expense.amount.to_string(),
            description: expense.description.clone(),
            policy: expense.policy.kind().to_string(),
            shares: format_shares(expense),
        }
    }
}

/// Row of `payments.csv`.
#[derive(Debug, Deserialize, Serialize)]
pub struct PaymentRecord {
    pub id: String,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub note: Option<String>,
}

impl PaymentRecord {
    pub fn parse(&self) -> Result<Payment, String> {
        let from = self.from.trim();
        let to = self.to.trim();
        if from.is_empty() || to.is_empty() {
            return Err("payment source and destination are required".to_string());
        }

        let amount = Money::from_str(&self.amount).map_err(|e| e.to_string())?;
        if !amount.is_positive() {
            return Err(format!("payment amount {} must be positive", amount));
        }

        Ok(Payment {
            id: self.id.trim().to_string(),
            from: PersonId::new(from),
            to: PersonId::new(to),
            amount,
            note: non_empty(&self.note),
        })
    }

    pub fn from_payment(payment: &Payment) -> Self {
        PaymentRecord {
            id: payment.id.clone(),
            from: payment.from.to_string(),
            to: payment.to.to_string(),
            amount: payment.amount.to_string(),
            note: payment.note.clone(),
        }
    }
}

/// Row of `outbox.csv`: a message waiting for an external gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutboxRecord {
    pub recipient: String,
    pub contact: String,
    pub message: String,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Characters the `shares` column uses to separate entries and values.
pub const SHARE_DELIMITERS: [char; 3] = [';', ',', '='];

/// Parses a `shares` list into the participant order and split policy.
pub fn parse_shares(kind: SplitKind, shares: &str) -> Result<(Vec<PersonId>, SplitPolicy), String> {
    let entries: Vec<&str> = shares
        .split(|c: char| c == ';' || c == ',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();

    match kind {
        SplitKind::Equal => {
            let participants = entries
                .iter()
                .map(|entry| {
                    if entry.contains('=') {
                        Err(format!("equal split takes names only, got '{}'", entry))
                    } else {
                        Ok(PersonId::new(*entry))
                    }
                })
                .collect::<Result<Vec<_>, String>>()?;
            Ok((participants, SplitPolicy::Equal))
        }
        SplitKind::Exact => {
            let (participants, amounts) = parse_weighted(&entries, |v| Money::from_str(v))?;
            Ok((participants, SplitPolicy::Exact(amounts)))
        }
        SplitKind::Percent => {
            let (participants, percents) = parse_weighted(&entries, |v| Percent::from_str(v))?;
            Ok((participants, SplitPolicy::Percent(percents)))
        }
    }
}

fn parse_weighted<V, E, F>(
    entries: &[&str],
    parse_value: F,
) -> Result<(Vec<PersonId>, BTreeMap<PersonId, V>), String>
where
    F: Fn(&str) -> Result<V, E>,
    E: ToString,
{
    let mut participants = Vec::with_capacity(entries.len());
    let mut values = BTreeMap::new();

    for entry in entries {
        let (name, value) = entry
            .split_once('=')
            .ok_or_else(|| format!("expected name=value, got '{}'", entry))?;
        let person = PersonId::new(name.trim());
        let value = parse_value(value).map_err(|e| e.to_string())?;
        participants.push(person.clone());
        values.insert(person, value);
    }

    Ok((participants, values))
}

/// Encodes an expense's participants and parameters as a `shares` list.
pub fn format_shares(expense: &Expense) -> String {
    expense
        .participants
        .iter()
        .map(|person| match &expense.policy {
            SplitPolicy::Equal => person.to_string(),
            SplitPolicy::Exact(amounts) => match amounts.get(person) {
                Some(amount) => format!("{}={}", person, amount),
                None => person.to_string(),
            },
            SplitPolicy::Percent(percents) => match percents.get(person) {
                Some(percent) => format!("{}={}", person, percent),
                None => person.to_string(),
            },
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense_record(policy: &str, shares: &str) -> ExpenseRecord {
        ExpenseRecord {
            id: "e1".to_string(),
            payer: "alice".to_string(),
            amount: "60.00".to_string(),
            description: "Groceries".to_string(),
            policy: policy.to_string(),
            shares: shares.to_string(),
        }
    }

    fn names(participants: &[PersonId]) -> Vec<&str> {
        participants.iter().map(PersonId::as_str).collect()
    }

    #[test]
    fn test_parse_equal_expense() {
        let expense = expense_record("equal", "alice; bob ;charlie").parse().unwrap();

        assert_eq!(expense.id, "e1");
        assert_eq!(expense.payer.as_str(), "alice");
        assert_eq!(expense.amount.to_string(), "60.00");
        assert_eq!(names(&expense.participants), ["alice", "bob", "charlie"]);
        assert_eq!(expense.policy, SplitPolicy::Equal);
    }

    #[test]
    fn test_parse_exact_expense() {
        let expense = expense_record("exact", "bob=45.00,alice=15")
            .parse()
            .unwrap();

        assert_eq!(names(&expense.participants), ["bob", "alice"]);
        match expense.policy {
            SplitPolicy::Exact(amounts) => {
                assert_eq!(amounts.get("alice").map(Money::to_string).as_deref(), Some("15.00"));
                assert_eq!(amounts.get("bob").map(Money::to_string).as_deref(), Some("45.00"));
            }
            other => panic!("Expected Exact, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_percent_expense() {
        let expense = expense_record("percent", "alice=62.5;bob=37.5")
            .parse()
            .unwrap();

        match expense.policy {
            SplitPolicy::Percent(percents) => {
                assert_eq!(percents.get("alice").map(Percent::hundredths), Some(6250));
            }
            other => panic!("Expected Percent, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_bad_encodings() {
        assert!(expense_record("shares", "alice").parse().is_err());
        assert!(expense_record("equal", "alice=1").parse().is_err());
        assert!(expense_record("exact", "alice").parse().is_err());
        assert!(expense_record("exact", "alice=ten").parse().is_err());
        assert!(expense_record("percent", "alice=33.333").parse().is_err());

        let mut record = expense_record("equal", "alice");
        record.amount = "12.345".to_string();
        assert!(record.parse().unwrap_err().contains("more than 2 decimal places"));
    }

    #[test]
    fn test_format_shares_round_trips_order() {
        let expense = expense_record("exact", "bob=45.00;alice=15.00").parse().unwrap();
        assert_eq!(format_shares(&expense), "bob=45.00;alice=15.00");

        let expense = expense_record("percent", "alice=62.50;bob=37.5").parse().unwrap();
        assert_eq!(format_shares(&expense), "alice=62.5;bob=37.5");
    }

    #[test]
    fn test_parse_payment() {
        let record = PaymentRecord {
            id: "p1".to_string(),
            from: " bob ".to_string(),
            to: "alice".to_string(),
            amount: "20".to_string(),
            note: Some("  ".to_string()),
        };

        let payment = record.parse().unwrap();
        assert_eq!(payment.from.as_str(), "bob");
        assert_eq!(payment.amount.to_string(), "20.00");
        assert_eq!(payment.note, None);
    }

    #[test]
    fn test_parse_payment_rejects_non_positive_amount() {
        let record = PaymentRecord {
            id: "p1".to_string(),
            from: "bob".to_string(),
            to: "alice".to_string(),
            amount: "0".to_string(),
            note: None,
        };
        assert!(record.parse().unwrap_err().contains("must be positive"));
    }

    #[test]
    fn test_parse_person() {
        let record = PersonRecord {
            id: "alice".to_string(),
            contact: Some("+15550100".to_string()),
        };
        let person = record.parse().unwrap();
        assert_eq!(person, Person::with_contact("alice", "+15550100"));

        let record = PersonRecord {
            id: " ".to_string(),
            contact: None,
        };
        assert!(record.parse().is_err());
    }

    #[test]
    fn test_parse_person_rejects_share_delimiters() {
        for id in ["smith, j", "a;b", "x=y"] {
            let record = PersonRecord {
                id: id.to_string(),
                contact: None,
            };
            let message = record.parse().unwrap_err();
            assert!(message.contains("must not contain"), "unexpected message: {}", message);
        }
    }
}
