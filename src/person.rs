//! Group members.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique handle of a person within a group.
///
/// Ordering is lexical on the handle; the settlement optimizer relies on it
/// to break ties deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    pub fn new(id: impl Into<String>) -> Self {
        PersonId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(id: &str) -> Self {
        PersonId::new(id)
    }
}

impl Borrow<str> for PersonId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A member of the group roster. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: PersonId,

    /// Phone number or other address used by notifiers.
    pub contact: Option<String>,
}

impl Person {
    pub fn new(id: impl Into<String>) -> Self {
        Person {
            id: PersonId::new(id),
            contact: None,
        }
    }

    pub fn with_contact(id: impl Into<String>, contact: impl Into<String>) -> Self {
        Person {
            id: PersonId::new(id),
            contact: Some(contact.into()),
        }
    }
}
