//! Totals shown next to the diagram.

use serde::Serialize;

use crate::{CashflowItem, EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_income: MoneyCents,
    pub total_expense: MoneyCents,
    /// `total_income - total_expense`, signed.
    pub balance: MoneyCents,
}

impl Summary {
    pub fn of(incomes: &[CashflowItem], expenses: &[CashflowItem]) -> ResultEngine<Self> {
        let overflow = || EngineError::InvalidAmount("total amount too large".to_string());

        let total_income =
            MoneyCents::checked_sum(incomes.iter().map(|item| item.amount)).ok_or_else(overflow)?;
        let total_expense =
            MoneyCents::checked_sum(expenses.iter().map(|item| item.amount)).ok_or_else(overflow)?;
        let balance = total_income.checked_sub(total_expense).ok_or_else(overflow)?;

        Ok(Self {
            total_income,
            total_expense,
            balance,
        })
    }

    /// `true` for a surplus or an exactly balanced budget.
    #[must_use]
    pub fn is_surplus(&self) -> bool {
        !self.balance.is_negative()
    }

    #[must_use]
    pub fn balance_label(&self) -> &'static str {
        if self.is_surplus() {
            "Annual Surplus"
        } else {
            "Annual Deficit"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_and_label() {
        let incomes = [CashflowItem::new("Salary", MoneyCents::from_major(54132))];
        let expenses = [CashflowItem::new("Rent", MoneyCents::from_major(18792))];
        let summary = Summary::of(&incomes, &expenses).unwrap();

        assert_eq!(summary.total_income, MoneyCents::from_major(54132));
        assert_eq!(summary.total_expense, MoneyCents::from_major(18792));
        assert_eq!(summary.balance, MoneyCents::from_major(35340));
        assert_eq!(summary.balance_label(), "Annual Surplus");
    }

    #[test]
    fn deficit_label_and_balanced_counts_as_surplus() {
        let incomes = [CashflowItem::new("Salary", MoneyCents::from_major(10))];
        let expenses = [CashflowItem::new("Rent", MoneyCents::from_major(20))];
        assert_eq!(
            Summary::of(&incomes, &expenses).unwrap().balance_label(),
            "Annual Deficit"
        );
        assert_eq!(Summary::of(&[], &[]).unwrap().balance_label(), "Annual Surplus");
    }
}
