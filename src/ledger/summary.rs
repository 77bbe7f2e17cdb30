use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{BudgetDocument, LedgerError, Reference};
use crate::database::models::CategoryType;

/// Name and type a reference resolved to at summary time.
#[derive(Debug, Clone)]
pub struct ResolvedLabel {
    pub name: String,
    pub kind: CategoryType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTotal {
    pub reference: Reference,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<CategoryType>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: String,
    pub revenues: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub revenues: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    /// Entries whose category or card no longer exists.
    pub unresolved: Decimal,
    pub by_reference: Vec<ReferenceTotal>,
    pub by_month: Vec<MonthTotal>,
}

fn accumulate(total: &mut Decimal, amount: Decimal) -> Result<(), LedgerError> {
    *total = total.checked_add(amount).ok_or(LedgerError::Overflow)?;
    Ok(())
}

/// Totals for the chart views over an inclusive day range.
pub fn summarize<F>(
    doc: &BudgetDocument,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    resolve: F,
) -> Result<BudgetSummary, LedgerError>
where
    F: Fn(&Reference) -> Option<ResolvedLabel>,
{
    let mut revenues = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    let mut unresolved = Decimal::ZERO;
    let mut by_reference: BTreeMap<Reference, ReferenceTotal> = BTreeMap::new();
    let mut by_month: BTreeMap<(i32, u32), MonthTotal> = BTreeMap::new();

    let in_range = |day: NaiveDate| from.map_or(true, |f| day >= f) && to.map_or(true, |t| day <= t);

    for entry in doc.entries.iter().filter(|e| in_range(e.date)) {
        let label = resolve(&entry.reference);

        let slot = by_reference.entry(entry.reference).or_insert_with(|| ReferenceTotal {
            reference: entry.reference,
            name: label.as_ref().map(|l| l.name.clone()),
            kind: label.as_ref().map(|l| l.kind),
            total: Decimal::ZERO,
        });
        accumulate(&mut slot.total, entry.amount)?;

        let Some(label) = label else {
            accumulate(&mut unresolved, entry.amount)?;
            continue;
        };

        let month = by_month
            .entry((entry.date.year(), entry.date.month()))
            .or_insert_with(|| MonthTotal {
                month: format!("{:04}-{:02}", entry.date.year(), entry.date.month()),
                revenues: Decimal::ZERO,
                expenses: Decimal::ZERO,
            });

        match label.kind {
            CategoryType::Revenues => {
                accumulate(&mut revenues, entry.amount)?;
                accumulate(&mut month.revenues, entry.amount)?;
            }
            CategoryType::Expenses => {
                accumulate(&mut expenses, entry.amount)?;
                accumulate(&mut month.expenses, entry.amount)?;
            }
        }
    }

    let balance = revenues.checked_sub(expenses).ok_or(LedgerError::Overflow)?;

    Ok(BudgetSummary {
        from,
        to,
        revenues,
        expenses,
        balance,
        unresolved,
        by_reference: by_reference.into_values().collect(),
        by_month: by_month.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::BudgetEntry;
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn groups_by_type_reference_and_month() {
        let salary = Reference::Category(Uuid::new_v4());
        let rent = Reference::Category(Uuid::new_v4());
        let coffee = Reference::UserCard(Uuid::new_v4());
        let gone = Reference::Category(Uuid::new_v4());

        let mut doc = BudgetDocument::empty(Uuid::new_v4());
        for (r, amount, d) in [
            (salary, 3000, day(2024, 1, 1)),
            (rent, 1200, day(2024, 1, 3)),
            (coffee, 5, day(2024, 1, 3)),
            (coffee, 4, day(2024, 2, 1)),
            (gone, 99, day(2024, 2, 2)),
        ] {
            doc.add(BudgetEntry::new(r, Decimal::from(amount), d).unwrap()).unwrap();
        }

        let summary = summarize(&doc, None, None, |r| {
            if *r == salary {
                Some(ResolvedLabel { name: "Salary".into(), kind: CategoryType::Revenues })
            } else if *r == rent {
                Some(ResolvedLabel { name: "Rent".into(), kind: CategoryType::Expenses })
            } else if *r == coffee {
                Some(ResolvedLabel { name: "Coffee".into(), kind: CategoryType::Expenses })
            } else {
                None
            }
        })
        .unwrap();

        assert_eq!(summary.revenues, Decimal::from(3000));
        assert_eq!(summary.expenses, Decimal::from(1209));
        assert_eq!(summary.balance, Decimal::from(1791));
        assert_eq!(summary.unresolved, Decimal::from(99));

        let coffee_total = summary.by_reference.iter().find(|t| t.reference == coffee).unwrap();
        assert_eq!(coffee_total.total, Decimal::from(9));

        assert_eq!(summary.by_month.len(), 2);
        assert_eq!(summary.by_month[0].month, "2024-01");
        assert_eq!(summary.by_month[0].expenses, Decimal::from(1205));
        assert_eq!(summary.by_month[1].month, "2024-02");
        assert_eq!(summary.by_month[1].expenses, Decimal::from(4));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let c = Reference::Category(Uuid::new_v4());
        let mut doc = BudgetDocument::empty(Uuid::new_v4());
        for d in 1..=5 {
            doc.add(BudgetEntry::new(c, Decimal::ONE, day(2024, 3, d)).unwrap()).unwrap();
        }

        let summary = summarize(&doc, Some(day(2024, 3, 2)), Some(day(2024, 3, 4)), |_| {
            Some(ResolvedLabel { name: "Food".into(), kind: CategoryType::Expenses })
        })
        .unwrap();
        assert_eq!(summary.expenses, Decimal::from(3));
    }

    #[test]
    fn totals_past_decimal_range_are_an_error() {
        let c = Reference::Category(Uuid::new_v4());
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let doc = BudgetDocument {
            owner_user_id: Uuid::new_v4(),
            entries: vec![
                BudgetEntry { reference: c, amount: huge, date: day(2024, 1, 1) },
                BudgetEntry { reference: c, amount: huge, date: day(2024, 1, 2) },
            ],
        };

        let result = summarize(&doc, None, None, |_| {
            Some(ResolvedLabel { name: "Food".into(), kind: CategoryType::Expenses })
        });
        assert_eq!(result, Err(LedgerError::Overflow));
    }
}
