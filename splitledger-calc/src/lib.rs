#![warn(clippy::uninlined_format_args)]

mod model;

use std::cmp::Reverse;

pub use model::{Payment, PersonBalance};

/// Balances with a magnitude below this many minor units are treated as
/// already settled, both when entering the pairing and when deciding that a
/// side needs no further payments.
pub const MATERIALITY_THRESHOLD: i64 = 1;

/// Settle the given balances with a greedy largest-debtor/largest-creditor
/// pairing.
///
/// People whose balance falls below the materiality threshold are skipped.
/// The rest are partitioned into debtors and creditors and each side is
/// sorted descending by owed amount (stable, so ties keep the caller's input
/// order). The two fronts are then matched repeatedly: each step pays
/// `min(debtor.remaining, creditor.remaining)` and moves past whichever side
/// drops to the threshold or below, until one side is exhausted.
///
/// Every emitted amount is positive, at most
/// `debtors.len() + creditors.len() - 1` payments are produced, and no
/// position ever pays or receives more than it originally owed or was owed.
/// A position matched at least once forgives at most one minor unit of
/// residue; zero-sum inputs without sub-threshold residues settle exactly.
pub fn minimize_settlements<Id: Clone>(
    people: impl IntoIterator<Item = PersonBalance<Id>>,
) -> Vec<Payment<Id>> {
    let mut debtors: Vec<(Id, i64)> = Vec::new();
    let mut creditors: Vec<(Id, i64)> = Vec::new();
    for person in people {
        if person.balance.abs() < MATERIALITY_THRESHOLD {
            continue;
        }
        if person.balance < 0 {
            debtors.push((person.id, -person.balance));
        } else {
            creditors.push((person.id, person.balance));
        }
    }

    if debtors.is_empty() || creditors.is_empty() {
        return Vec::new();
    }

    debtors.sort_by_key(|&(_, owed)| Reverse(owed));
    creditors.sort_by_key(|&(_, owed)| Reverse(owed));

    let mut payments = Vec::with_capacity(debtors.len() + creditors.len() - 1);
    let mut debtor_idx = 0;
    let mut creditor_idx = 0;
    while debtor_idx < debtors.len() && creditor_idx < creditors.len() {
        let amount = debtors[debtor_idx].1.min(creditors[creditor_idx].1);
        payments.push(Payment {
            from: debtors[debtor_idx].0.clone(),
            to: creditors[creditor_idx].0.clone(),
            amount,
        });

        debtors[debtor_idx].1 -= amount;
        creditors[creditor_idx].1 -= amount;
        if debtors[debtor_idx].1 <= MATERIALITY_THRESHOLD {
            debtor_idx += 1;
        }
        if creditors[creditor_idx].1 <= MATERIALITY_THRESHOLD {
            creditor_idx += 1;
        }
    }

    payments
}
