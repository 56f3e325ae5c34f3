#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    BalanceAccumulator, Balances, Expense, ExpenseValidationError, Money, ParticipantId,
    RemainderPolicy, Settlement,
};
pub use services::{BalanceEngine, SettlementMinimizer};
