use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use splitledger_domain::{Balances, Expense, ParticipantId};

/// Identifier of a group ledger.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(SmolStr);

impl GroupId {
    pub fn new(value: impl Into<SmolStr>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-group sequential expense identifier, allocated on insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub u64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group-scoped state the store persists: the member roster plus the expense
/// collection, in insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: GroupId,
    pub members: Vec<ParticipantId>,
    pub expenses: IndexMap<ExpenseId, Expense>,
    next_expense_id: u64,
}

impl GroupRecord {
    pub fn new(id: GroupId, members: Vec<ParticipantId>) -> Self {
        Self {
            id,
            members,
            expenses: IndexMap::new(),
            next_expense_id: 1,
        }
    }

    pub fn is_member(&self, participant: &ParticipantId) -> bool {
        self.members.contains(participant)
    }

    pub(crate) fn allocate_expense_id(&mut self) -> ExpenseId {
        let id = ExpenseId(self.next_expense_id);
        self.next_expense_id += 1;
        id
    }
}

/// Raw expense input as entered in the surrounding application, before
/// identity normalization and validation.
#[derive(Clone, Debug)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount_minor: i64,
    pub payer: String,
    pub participants: Vec<String>,
}

/// Events emitted at the expense-mutation boundary, carrying the freshly
/// recomputed balances so consumers never reach back into the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    ExpenseAdded {
        group_id: GroupId,
        expense_id: ExpenseId,
        expense: Expense,
        balances: Balances,
        /// Expense identities that are not in the group's member roster.
        invited: Vec<ParticipantId>,
    },
    ExpenseRemoved {
        group_id: GroupId,
        expense_id: ExpenseId,
        expense: Expense,
        balances: Balances,
    },
}

impl LedgerEvent {
    pub fn group_id(&self) -> &GroupId {
        match self {
            LedgerEvent::ExpenseAdded { group_id, .. }
            | LedgerEvent::ExpenseRemoved { group_id, .. } => group_id,
        }
    }

    pub fn balances(&self) -> &Balances {
        match self {
            LedgerEvent::ExpenseAdded { balances, .. }
            | LedgerEvent::ExpenseRemoved { balances, .. } => balances,
        }
    }
}
