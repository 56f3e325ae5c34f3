use chrono::Utc;
use fxhash::FxHashSet;
use splitledger_domain::{
    BalanceEngine, Balances, Expense, Money, ParticipantId, Settlement, SettlementMinimizer,
};

use crate::{
    error::LedgerError,
    model::{ExpenseDraft, ExpenseId, GroupId, GroupRecord, LedgerEvent},
    ports::{EventPublisher, GroupStore},
};

/// Application service at the expense-mutation boundary.
///
/// Owns no state of its own: group records come from the injected store,
/// balances are recomputed from scratch on every call, and each mutation
/// publishes an event for the asynchronous notification side.
pub struct GroupLedgerService<'a> {
    store: &'a dyn GroupStore,
    publisher: &'a dyn EventPublisher,
}

impl<'a> GroupLedgerService<'a> {
    pub fn new(store: &'a dyn GroupStore, publisher: &'a dyn EventPublisher) -> Self {
        Self { store, publisher }
    }

    /// Normalize, validate and append a drafted expense, then publish the
    /// recomputed balances.
    pub fn add_expense(
        &self,
        group_id: &GroupId,
        draft: ExpenseDraft,
    ) -> Result<ExpenseId, LedgerError> {
        let mut record = self.load_group(group_id)?;

        let payer = normalize_identity(&draft.payer)?;
        let participants = draft
            .participants
            .iter()
            .map(|raw| normalize_identity(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let expense = Expense::new(
            draft.description,
            Money::from_minor(draft.amount_minor),
            payer,
            participants,
            Utc::now(),
        )?;

        let expense_id = record.allocate_expense_id();
        record.expenses.insert(expense_id, expense.clone());
        self.store.save(&record)?;

        let balances = self.recompute(&record);
        let invited = invited_identities(&record, &expense);
        tracing::info!(
            group_id = %record.id,
            expense_id = %expense_id,
            amount = %expense.amount(),
            participant_count = expense.participants().len(),
            invited_count = invited.len(),
            "expense added"
        );
        self.publisher.publish(LedgerEvent::ExpenseAdded {
            group_id: record.id.clone(),
            expense_id,
            expense,
            balances,
            invited,
        });

        Ok(expense_id)
    }

    /// Remove an expense and publish the recomputed balances.
    pub fn remove_expense(
        &self,
        group_id: &GroupId,
        expense_id: ExpenseId,
    ) -> Result<(), LedgerError> {
        let mut record = self.load_group(group_id)?;

        let Some(expense) = record.expenses.shift_remove(&expense_id) else {
            return Err(LedgerError::ExpenseNotFound {
                group_id: group_id.clone(),
                expense_id,
            });
        };
        self.store.save(&record)?;

        let balances = self.recompute(&record);
        tracing::info!(
            group_id = %record.id,
            expense_id = %expense_id,
            amount = %expense.amount(),
            "expense removed"
        );
        self.publisher.publish(LedgerEvent::ExpenseRemoved {
            group_id: record.id.clone(),
            expense_id,
            expense,
            balances,
        });

        Ok(())
    }

    /// Current net balances of the group.
    pub fn balances(&self, group_id: &GroupId) -> Result<Balances, LedgerError> {
        let record = self.load_group(group_id)?;
        Ok(self.recompute(&record))
    }

    /// Payment plan settling the group's current balances.
    pub fn settlement_plan(&self, group_id: &GroupId) -> Result<Vec<Settlement>, LedgerError> {
        let balances = self.balances(group_id)?;
        Ok(SettlementMinimizer.minimize(&balances))
    }

    fn load_group(&self, group_id: &GroupId) -> Result<GroupRecord, LedgerError> {
        self.store
            .load(group_id)?
            .ok_or_else(|| LedgerError::GroupNotFound(group_id.clone()))
    }

    fn recompute(&self, record: &GroupRecord) -> Balances {
        BalanceEngine.compute(record.members.iter().cloned(), record.expenses.values())
    }
}

fn normalize_identity(raw: &str) -> Result<ParticipantId, LedgerError> {
    let id = ParticipantId::normalize(raw);
    if !id.has_digits() {
        return Err(LedgerError::InvalidIdentity {
            raw: raw.to_owned(),
        });
    }
    Ok(id)
}

/// Identities on the expense that are not in the roster, payer first, each
/// reported once.
fn invited_identities(record: &GroupRecord, expense: &Expense) -> Vec<ParticipantId> {
    let mut seen: FxHashSet<&ParticipantId> = FxHashSet::default();
    let mut invited = Vec::new();
    for identity in std::iter::once(expense.payer()).chain(expense.participants()) {
        if record.is_member(identity) || !seen.insert(identity) {
            continue;
        }
        invited.push(identity.clone());
    }
    invited
}
