use std::{
    collections::BTreeMap,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use arcstr::ArcStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Canonical identity of a group participant.
///
/// The key is a phone-number-like string in a canonical E.164-like form and
/// joins members, invited participants, and expense payer/participant lists.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(SmolStr);

impl ParticipantId {
    /// Wrap an identity that is already in canonical form.
    pub fn new(value: impl Into<SmolStr>) -> Self {
        Self(value.into())
    }

    /// Canonicalize a raw identity string.
    ///
    /// Keeps digits, keeps a single leading `+`, rewrites a leading `00`
    /// international prefix to `+`, and drops everything else (spaces,
    /// dashes, parentheses). Re-normalizing an already-normalized identity
    /// returns it unchanged.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

        let canonical = if trimmed.starts_with('+') {
            format!("+{digits}")
        } else if let Some(rest) = digits.strip_prefix("00") {
            format!("+{rest}")
        } else {
            digits
        };
        Self(SmolStr::from(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An identity has to carry at least one digit to be addressable.
    pub fn has_digits(&self) -> bool {
        self.0.chars().any(|c| c.is_ascii_digit())
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How leftover minor units are assigned when an amount does not divide
/// evenly across shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemainderPolicy {
    /// Give one extra minor unit to the earliest shares, in share order.
    FrontLoad,
}

/// Signed monetary amount in minor currency units (cents).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Minor units per major unit (cents per dollar).
    pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

    pub fn from_minor(value: i64) -> Self {
        Self(value)
    }

    pub fn from_major(value: i64) -> Self {
        Self(value * Self::MINOR_UNITS_PER_MAJOR)
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }

    pub fn abs(self) -> i64 {
        self.0.abs()
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn signum(self) -> i64 {
        self.0.signum()
    }

    /// Split into `count` shares that sum back to the original amount.
    ///
    /// Shares differ by at most one minor unit. Under
    /// [`RemainderPolicy::FrontLoad`] the leftover units go to the earliest
    /// shares, in order. `count` must be non-zero; splitting across zero
    /// shares is a precondition violation and panics with a message instead
    /// of dividing by zero.
    pub fn split_even(self, count: usize, policy: RemainderPolicy) -> impl Iterator<Item = Money> {
        assert!(count > 0, "cannot split an amount across zero shares");
        match policy {
            RemainderPolicy::FrontLoad => {}
        }

        let divisor = count as i64;
        let base = self.0 / divisor;
        let remainder = (self.0 % divisor).unsigned_abs() as usize;
        let extra = self.0.signum();

        (0..count).map(move |idx| {
            let mut share = base;
            if idx < remainder {
                share += extra;
            }
            Money(share)
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minor = Self::MINOR_UNITS_PER_MAJOR as u64;
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", magnitude / minor, magnitude % minor)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        Self(iter.map(|money| money.0).sum())
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        Self(iter.map(|money| money.0).sum())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpenseValidationError {
    BlankDescription,
    NonPositiveAmount(Money),
    EmptyParticipants,
}

/// A shared expense, immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    description: ArcStr,
    amount: Money,
    payer: ParticipantId,
    participants: Vec<ParticipantId>,
    created_at: DateTime<Utc>,
}

impl Expense {
    /// Build a validated expense.
    ///
    /// The participant order is preserved exactly as given; it decides which
    /// participants absorb the leftover minor units of an uneven split.
    pub fn new(
        description: impl Into<ArcStr>,
        amount: Money,
        payer: ParticipantId,
        participants: Vec<ParticipantId>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ExpenseValidationError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ExpenseValidationError::BlankDescription);
        }
        if amount.signum() <= 0 {
            return Err(ExpenseValidationError::NonPositiveAmount(amount));
        }
        if participants.is_empty() {
            return Err(ExpenseValidationError::EmptyParticipants);
        }

        Ok(Self {
            description,
            amount,
            payer,
            participants,
            created_at,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn payer(&self) -> &ParticipantId {
        &self.payer
    }

    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Share debited to each participant, in stored participant order.
    pub fn shares(&self) -> impl Iterator<Item = Money> {
        self.amount
            .split_even(self.participants.len(), RemainderPolicy::FrontLoad)
    }
}

/// Balance table keyed by participant.
///
/// Positive: net amount the group owes the participant. Negative: net amount
/// the participant owes the group.
pub type Balances = BTreeMap<ParticipantId, Money>;

/// Folds expenses into balances over a zero-initialized member universe.
#[derive(Debug, Default)]
pub struct BalanceAccumulator {
    balances: Balances,
}

impl BalanceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every member at zero so members without activity still appear.
    pub fn with_members<I>(members: I) -> Self
    where
        I: IntoIterator<Item = ParticipantId>,
    {
        let balances = members
            .into_iter()
            .map(|member| (member, Money::ZERO))
            .collect();
        Self { balances }
    }

    /// Credit the payer with the full amount, then debit each participant's
    /// share. Identities outside the seeded universe materialize at zero on
    /// first touch.
    pub fn apply(&mut self, expense: &Expense) {
        debug_assert!(!expense.participants().is_empty());

        *self
            .balances
            .entry(expense.payer().clone())
            .or_insert(Money::ZERO) += expense.amount();

        for (participant, share) in expense.participants().iter().zip(expense.shares()) {
            *self
                .balances
                .entry(participant.clone())
                .or_insert(Money::ZERO) -= share;
        }
    }

    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    pub fn into_balances(self) -> Balances {
        self.balances
    }
}

/// A directed payment recommendation: `from` pays `to` the given amount.
///
/// Settlement lists are transient; they are recomputed from the balance
/// table on demand and never stored as authoritative state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}
