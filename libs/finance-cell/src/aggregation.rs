//! Monthly financial roll-up.
//!
//! The rules are deliberately asymmetric and must stay that way:
//! - net income counts only paid, non-speculative income;
//! - possible (speculative) income counts whatever its status;
//! - pending non-speculative income appears in no total at all, only in the
//!   raw transaction list;
//! - only paid expenses count;
//! - balance = net income - expenses, excluding everything speculative.

use chrono::Datelike;

use crate::models::{MonthlyBalance, Transaction, TransactionStatus, TransactionType};

/// Client-side month filter (1-based month), matching how the transaction
/// set is fetched whole per tenant and narrowed in memory.
pub fn in_month(transaction: &Transaction, year: i32, month: u32) -> bool {
    transaction.date.year() == year && transaction.date.month() == month
}

pub fn transactions_in_month<'a>(
    transactions: &'a [Transaction],
    year: i32,
    month: u32,
) -> Vec<&'a Transaction> {
    transactions.iter().filter(|t| in_month(t, year, month)).collect()
}

pub fn monthly_balance(transactions: &[Transaction], year: i32, month: u32) -> MonthlyBalance {
    let month_txs = transactions_in_month(transactions, year, month);

    let net_income: f64 = month_txs.iter()
        .filter(|t| {
            t.transaction_type == TransactionType::Income
                && t.status == TransactionStatus::Paid
                && !t.is_possible
        })
        .map(|t| t.amount)
        .sum();

    // The possible flag dominates status: a paid-but-possible entry still
    // lands here and never in net income.
    let possible_income: f64 = month_txs.iter()
        .filter(|t| t.transaction_type == TransactionType::Income && t.is_possible)
        .map(|t| t.amount)
        .sum();

    let gross_income = net_income + possible_income;

    let expenses: f64 = month_txs.iter()
        .filter(|t| {
            t.transaction_type == TransactionType::Expense
                && t.status == TransactionStatus::Paid
        })
        .map(|t| t.amount)
        .sum();

    MonthlyBalance {
        gross_income,
        net_income,
        possible_income,
        expenses,
        balance: net_income - expenses,
    }
}
