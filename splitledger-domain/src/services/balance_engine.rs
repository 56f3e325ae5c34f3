use crate::model::{BalanceAccumulator, Balances, Expense, Money, ParticipantId};

/// Balance computation service.
pub struct BalanceEngine;

impl BalanceEngine {
    /// Fold a group snapshot into net balances.
    ///
    /// Every member is seeded at zero, so members without expense activity
    /// still appear; payers and participants outside the roster materialize
    /// on first touch. The fold is commutative per expense, so the order of
    /// `expenses` cannot change the result.
    ///
    /// # Arguments
    /// * `members` - identities forming the group roster
    /// * `expenses` - any finite sequence of validated expenses
    ///
    /// # Returns
    /// Balance table summing to zero across the closed participant universe.
    pub fn compute<'a, M, E>(&self, members: M, expenses: E) -> Balances
    where
        M: IntoIterator<Item = ParticipantId>,
        E: IntoIterator<Item = &'a Expense>,
    {
        let mut accumulator = BalanceAccumulator::with_members(members);
        let mut expense_count = 0usize;
        for expense in expenses {
            accumulator.apply(expense);
            expense_count += 1;
        }
        let balances = accumulator.into_balances();

        // Each expense credits exactly what its shares debit, so the table
        // sums to zero no matter which identities it picked up along the way.
        debug_assert!(balances.values().sum::<Money>().is_zero());
        tracing::debug!(
            expense_count,
            participant_count = balances.len(),
            "computed group balances"
        );

        balances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use rstest::{fixture, rstest};

    #[fixture]
    fn engine() -> BalanceEngine {
        BalanceEngine
    }

    fn id(value: &str) -> ParticipantId {
        ParticipantId::new(value)
    }

    fn expense(description: &str, amount: i64, payer: &str, participants: &[&str]) -> Expense {
        Expense::new(
            description,
            Money::from_minor(amount),
            id(payer),
            participants.iter().map(|p| id(p)).collect(),
            DateTime::UNIX_EPOCH,
        )
        .expect("test expense should be valid")
    }

    fn assert_balances(balances: &Balances, expected: &[(&str, i64)]) {
        assert_eq!(balances.len(), expected.len());
        for (participant, amount) in expected {
            assert_eq!(
                balances.get(&id(participant)),
                Some(&Money::from_minor(*amount)),
                "balance mismatch for {participant}"
            );
        }
    }

    #[rstest]
    fn trip_example_balances(engine: BalanceEngine) {
        let members = [id("alice"), id("bob"), id("charlie")];
        let expenses = [
            expense("Hotel", 30000, "alice", &["alice", "bob", "charlie"]),
            expense("Dinner", 12000, "bob", &["alice", "bob", "charlie"]),
        ];

        let balances = engine.compute(members.clone(), &expenses);

        assert_balances(
            &balances,
            &[("alice", 16000), ("bob", -2000), ("charlie", -14000)],
        );
    }

    #[rstest]
    fn empty_group_yields_empty_table(engine: BalanceEngine) {
        let members: [ParticipantId; 0] = [];
        let expenses: [Expense; 0] = [];

        let balances = engine.compute(members, &expenses);

        assert!(balances.is_empty());
    }

    #[rstest]
    fn idle_members_stay_at_zero(engine: BalanceEngine) {
        let members = [id("alice"), id("bob")];
        let expenses: [Expense; 0] = [];

        let balances = engine.compute(members, &expenses);

        assert_balances(&balances, &[("alice", 0), ("bob", 0)]);
    }

    #[rstest]
    fn outside_payer_materializes_in_table(engine: BalanceEngine) {
        let members = [id("alice")];
        let expenses = [expense("Taxi", 900, "dana", &["alice"])];

        let balances = engine.compute(members, &expenses);

        assert_balances(&balances, &[("alice", -900), ("dana", 900)]);
    }

    #[rstest]
    fn remainder_goes_to_earliest_participants(engine: BalanceEngine) {
        let members = [id("alice"), id("bob"), id("charlie")];
        let expenses = [expense("Coffee", 100, "alice", &["alice", "bob", "charlie"])];

        let balances = engine.compute(members, &expenses);

        // base 33, one leftover cent charged to the first-listed participant
        assert_balances(&balances, &[("alice", 66), ("bob", -33), ("charlie", -33)]);
    }

    #[rstest]
    fn participant_order_decides_remainder_absorber(engine: BalanceEngine) {
        let members = [id("alice"), id("bob"), id("charlie")];
        let expenses = [expense("Coffee", 100, "alice", &["charlie", "bob", "alice"])];

        let balances = engine.compute(members, &expenses);

        assert_balances(&balances, &[("alice", 67), ("bob", -33), ("charlie", -34)]);
    }

    #[rstest]
    fn expense_order_does_not_matter(engine: BalanceEngine) {
        let members = [id("alice"), id("bob"), id("charlie")];
        let forward = [
            expense("Hotel", 30000, "alice", &["alice", "bob", "charlie"]),
            expense("Dinner", 12000, "bob", &["alice", "bob", "charlie"]),
            expense("Coffee", 101, "charlie", &["bob", "charlie"]),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(
            engine.compute(members.clone(), &forward),
            engine.compute(members, &reversed)
        );
    }

    #[rstest]
    fn solo_expense_nets_to_zero(engine: BalanceEngine) {
        let members = [id("alice")];
        let expenses = [expense("Groceries", 4200, "alice", &["alice"])];

        let balances = engine.compute(members, &expenses);

        assert_balances(&balances, &[("alice", 0)]);
    }
}
