use splitledger_application::{EventPublisher, GroupId, LedgerEvent};
use splitledger_domain::{Balances, Expense, Money, ParticipantId};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Error type for outbound notification delivery
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Recipient {0} cannot be reached")]
    Unreachable(ParticipantId),
    #[error("Transport rejected the message: {0}")]
    Rejected(String),
}

/// Trait for the transport that carries participant-facing messages
pub trait MessageChannel: Clone + Send + Sync + 'static {
    /// Deliver one message to one recipient
    fn deliver(
        &self,
        recipient: &ParticipantId,
        message: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Sender half of the ledger event bus.
///
/// Publishing never blocks the ledger service; events queue on an unbounded
/// channel until the relay drains them.
#[derive(Clone)]
pub struct ChannelEventBus {
    sender: UnboundedSender<LedgerEvent>,
}

/// Build a connected bus plus the receiver that feeds a [`NotificationRelay`].
pub fn event_bus() -> (ChannelEventBus, UnboundedReceiver<LedgerEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ChannelEventBus { sender }, receiver)
}

impl EventPublisher for ChannelEventBus {
    fn publish(&self, event: LedgerEvent) {
        if self.sender.send(event).is_err() {
            tracing::warn!("Dropping ledger event, relay receiver is gone");
        }
    }
}

/// Consumes ledger events off the bus and messages invited participants.
pub struct NotificationRelay<C> {
    channel: C,
}

impl<C: MessageChannel> NotificationRelay<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Drain events until every sender half of the bus is dropped.
    pub async fn run(self, mut events: UnboundedReceiver<LedgerEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        tracing::debug!("Notification relay stopped");
    }

    async fn handle(&self, event: LedgerEvent) {
        match event {
            LedgerEvent::ExpenseAdded {
                group_id,
                expense_id,
                expense,
                balances,
                invited,
            } => {
                for recipient in &invited {
                    let message = expense_added_message(&group_id, &expense, recipient, &balances);
                    if let Err(e) = self.channel.deliver(recipient, &message).await {
                        tracing::warn!(
                            group_id = %group_id,
                            expense_id = %expense_id,
                            recipient = %recipient,
                            error = %e,
                            "Failed to deliver invitation"
                        );
                    }
                }
            }
            LedgerEvent::ExpenseRemoved {
                group_id,
                expense_id,
                ..
            } => {
                tracing::debug!(group_id = %group_id, expense_id = %expense_id, "Expense removed, nothing to deliver");
            }
        }
    }
}

/// Compose the invitation sent to a participant who is on an expense but not
/// on the group roster yet.
fn expense_added_message(
    group_id: &GroupId,
    expense: &Expense,
    recipient: &ParticipantId,
    balances: &Balances,
) -> String {
    let share = expense
        .participants()
        .iter()
        .position(|participant| participant == recipient)
        .and_then(|index| expense.shares().nth(index))
        .unwrap_or(Money::ZERO);
    let net = balances.get(recipient).copied().unwrap_or(Money::ZERO);

    format!(
        "You were added to group {group_id} to split \"{description}\" paid by {payer}. Your share is {share}. {balance}",
        description = expense.description(),
        payer = expense.payer(),
        balance = balance_line(net),
    )
}

fn balance_line(net: Money) -> String {
    match net.signum() {
        1 => format!("The group owes you {net} overall."),
        -1 => format!("You owe the group {} overall.", -net),
        _ => "You are settled up.".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use splitledger_application::ExpenseId;
    use std::sync::{Arc, Mutex};

    const ALICE: &str = "+15550100001";
    const BOB: &str = "+15550100002";
    const OUTSIDER: &str = "+15550109999";

    #[derive(Clone, Default)]
    struct RecordingChannel {
        deliveries: Arc<Mutex<Vec<(ParticipantId, String)>>>,
    }

    impl RecordingChannel {
        fn take(&self) -> Vec<(ParticipantId, String)> {
            std::mem::take(&mut *self.deliveries.lock().expect("recorder mutex poisoned"))
        }
    }

    impl MessageChannel for RecordingChannel {
        fn deliver(
            &self,
            recipient: &ParticipantId,
            message: &str,
        ) -> impl Future<Output = Result<(), DeliveryError>> + Send {
            self.deliveries
                .lock()
                .expect("recorder mutex poisoned")
                .push((recipient.clone(), message.to_owned()));
            std::future::ready(Ok(()))
        }
    }

    #[derive(Clone)]
    struct UnreachableChannel;

    impl MessageChannel for UnreachableChannel {
        fn deliver(
            &self,
            recipient: &ParticipantId,
            _message: &str,
        ) -> impl Future<Output = Result<(), DeliveryError>> + Send {
            std::future::ready(Err(DeliveryError::Unreachable(recipient.clone())))
        }
    }

    fn boat_expense() -> Expense {
        Expense::new(
            "Boat",
            Money::from_minor(30000),
            ParticipantId::new(ALICE),
            vec![ParticipantId::new(ALICE), ParticipantId::new(OUTSIDER)],
            DateTime::UNIX_EPOCH,
        )
        .expect("expense must validate")
    }

    fn added_event() -> LedgerEvent {
        let balances: Balances = [
            (ParticipantId::new(ALICE), Money::from_minor(15000)),
            (ParticipantId::new(BOB), Money::ZERO),
            (ParticipantId::new(OUTSIDER), Money::from_minor(-15000)),
        ]
        .into_iter()
        .collect();
        LedgerEvent::ExpenseAdded {
            group_id: GroupId::new("trip"),
            expense_id: ExpenseId(1),
            expense: boat_expense(),
            balances,
            invited: vec![ParticipantId::new(OUTSIDER)],
        }
    }

    fn removed_event() -> LedgerEvent {
        LedgerEvent::ExpenseRemoved {
            group_id: GroupId::new("trip"),
            expense_id: ExpenseId(1),
            expense: boat_expense(),
            balances: Balances::new(),
        }
    }

    #[tokio::test]
    async fn relay_messages_each_invited_participant() {
        let channel = RecordingChannel::default();
        let (bus, receiver) = event_bus();
        let relay = tokio::spawn(NotificationRelay::new(channel.clone()).run(receiver));

        bus.publish(added_event());
        drop(bus);
        relay.await.expect("relay task must finish");

        let deliveries = channel.take();
        assert_eq!(deliveries.len(), 1);
        let (recipient, message) = &deliveries[0];
        assert_eq!(recipient, &ParticipantId::new(OUTSIDER));
        assert!(message.contains("trip"), "missing group id: {message}");
        assert!(message.contains("Boat"), "missing description: {message}");
        assert!(message.contains(ALICE), "missing payer: {message}");
        assert!(message.contains("150.00"), "missing share: {message}");
        assert!(
            message.contains("You owe the group 150.00"),
            "missing balance line: {message}"
        );
    }

    #[tokio::test]
    async fn removal_events_produce_no_messages() {
        let channel = RecordingChannel::default();
        let (bus, receiver) = event_bus();
        let relay = tokio::spawn(NotificationRelay::new(channel.clone()).run(receiver));

        bus.publish(removed_event());
        drop(bus);
        relay.await.expect("relay task must finish");

        assert!(channel.take().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_does_not_stop_the_relay() {
        let (bus, receiver) = event_bus();
        let relay = tokio::spawn(NotificationRelay::new(UnreachableChannel).run(receiver));

        bus.publish(added_event());
        bus.publish(removed_event());
        drop(bus);

        relay.await.expect("relay task must survive failed deliveries");
    }

    #[test]
    fn publish_after_relay_shutdown_is_dropped() {
        let (bus, receiver) = event_bus();
        drop(receiver);

        bus.publish(removed_event());
    }

    #[test]
    fn creditor_and_settled_balance_lines() {
        let balances: Balances = [(ParticipantId::new(ALICE), Money::from_minor(2500))]
            .into_iter()
            .collect();
        let creditor_message = expense_added_message(
            &GroupId::new("trip"),
            &boat_expense(),
            &ParticipantId::new(ALICE),
            &balances,
        );
        assert!(
            creditor_message.contains("The group owes you 25.00"),
            "missing creditor line: {creditor_message}"
        );

        let settled_message = expense_added_message(
            &GroupId::new("trip"),
            &boat_expense(),
            &ParticipantId::new(BOB),
            &Balances::new(),
        );
        assert!(
            settled_message.contains("You are settled up."),
            "missing settled line: {settled_message}"
        );
    }
}
