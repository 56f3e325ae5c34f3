use splitledger_domain::ExpenseValidationError;

use crate::model::{ExpenseId, GroupId};

/// Failures surfaced by store adapters at the port boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    Backend(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerError {
    GroupNotFound(GroupId),
    ExpenseNotFound {
        group_id: GroupId,
        expense_id: ExpenseId,
    },
    /// The raw identity canonicalized to something without a single digit.
    InvalidIdentity {
        raw: String,
    },
    Validation(ExpenseValidationError),
    Store(StoreError),
}

impl From<ExpenseValidationError> for LedgerError {
    fn from(err: ExpenseValidationError) -> Self {
        LedgerError::Validation(err)
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        LedgerError::Store(err)
    }
}
