/// Net position of one person entering settlement (positive: the group owes
/// them, negative: they owe the group).
/// The unit is an integer minor currency unit (e.g. cents).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PersonBalance<Id> {
    pub id: Id,
    pub balance: i64,
}

/// A single recommended payment from a debtor to a creditor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payment<Id> {
    pub from: Id,
    pub to: Id,
    pub amount: i64,
}
