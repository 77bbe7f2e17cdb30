use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{validate_amount, validate_new_amount, LedgerError, Reference};

/// One dated amount booked against a category or card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub reference: Reference,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl BudgetEntry {
    pub fn new(reference: Reference, amount: Decimal, date: NaiveDate) -> Result<Self, LedgerError> {
        Ok(Self {
            reference,
            amount: validate_new_amount(amount)?,
            date,
        })
    }

    /// Matching rule shared by update and delete: same reference kind and id,
    /// same calendar day.
    pub fn matches(&self, reference: &Reference, day: NaiveDate) -> bool {
        self.reference == *reference && self.date == day
    }
}

/// A single structural change to a user's budget. Stores apply these while
/// holding the document lock.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerChange {
    Add(BudgetEntry),
    SetAmount {
        reference: Reference,
        date: NaiveDate,
        amount: Decimal,
    },
    Remove {
        reference: Reference,
        date: NaiveDate,
    },
}

impl LedgerChange {
    /// Only an add may bring a missing document into existence.
    pub fn creates_document(&self) -> bool {
        matches!(self, LedgerChange::Add(_))
    }
}

/// The per-user budget aggregate. Saved as a whole after every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetDocument {
    pub owner_user_id: Uuid,
    pub entries: Vec<BudgetEntry>,
}

impl BudgetDocument {
    pub fn empty(owner_user_id: Uuid) -> Self {
        Self {
            owner_user_id,
            entries: Vec::new(),
        }
    }

    pub fn position(&self, reference: &Reference, day: NaiveDate) -> Option<usize> {
        self.entries.iter().position(|entry| entry.matches(reference, day))
    }

    pub fn find(&self, reference: &Reference, day: NaiveDate) -> Option<&BudgetEntry> {
        self.position(reference, day).map(|idx| &self.entries[idx])
    }

    pub fn add(&mut self, entry: BudgetEntry) -> Result<(), LedgerError> {
        if self.position(&entry.reference, entry.date).is_some() {
            return Err(LedgerError::Duplicate {
                reference: entry.reference,
                day: entry.date,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn set_amount(&mut self, reference: &Reference, day: NaiveDate, amount: Decimal) -> Result<(), LedgerError> {
        let amount = validate_amount(amount)?;
        let idx = self.position(reference, day).ok_or(LedgerError::NotFound {
            reference: *reference,
            day,
        })?;
        self.entries[idx].amount = amount;
        Ok(())
    }

    pub fn remove(&mut self, reference: &Reference, day: NaiveDate) -> Result<BudgetEntry, LedgerError> {
        let idx = self.position(reference, day).ok_or(LedgerError::NotFound {
            reference: *reference,
            day,
        })?;
        Ok(self.entries.remove(idx))
    }

    /// Apply a change. On error the document is left untouched.
    pub fn apply(&mut self, change: LedgerChange) -> Result<(), LedgerError> {
        match change {
            LedgerChange::Add(entry) => self.add(entry),
            LedgerChange::SetAmount { reference, date, amount } => self.set_amount(&reference, date, amount),
            LedgerChange::Remove { reference, date } => self.remove(&reference, date).map(|_| ()),
        }
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.entries.iter().map(|entry| &entry.reference)
    }
}
