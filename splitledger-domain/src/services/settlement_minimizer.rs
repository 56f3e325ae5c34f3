use splitledger_calc::{PersonBalance, minimize_settlements};

use crate::model::{Balances, Money, ParticipantId, Settlement};

/// Settlement planning service over a computed balance table.
pub struct SettlementMinimizer;

impl SettlementMinimizer {
    /// Turn a balance table into an ordered list of payments.
    ///
    /// # Arguments
    /// * `balances` - balance table (participant -> net amount)
    ///
    /// # Returns
    /// Greedy largest-debtor/largest-creditor payment plan; deterministic
    /// for identical input.
    pub fn minimize(&self, balances: &Balances) -> Vec<Settlement> {
        // Invariant for deterministic tie-break: `Balances` is a BTreeMap
        // keyed by ParticipantId, so positions enter the pairing in stable
        // ascending-identity order and ties resolve the same way every run.
        let positions = balances.iter().map(|(participant, balance)| PersonBalance {
            id: participant,
            balance: balance.minor_units(),
        });

        let payments = minimize_settlements(positions);

        let settlements: Vec<Settlement> = payments
            .into_iter()
            .map(|payment| Settlement {
                from: payment.from.clone(),
                to: payment.to.clone(),
                amount: Money::from_minor(payment.amount),
            })
            .collect();

        let active_positions = balances
            .values()
            .filter(|balance| !balance.is_zero())
            .count();
        debug_assert!(settlements.len() <= active_positions.saturating_sub(1));
        tracing::debug!(
            position_count = balances.len(),
            active_positions,
            settlement_count = settlements.len(),
            "minimized settlement plan"
        );

        settlements
    }
}
