//! Best-effort notifications that a report was generated.
//!
//! Publishing never blocks the request that generated the report. Events are
//! dropped when nobody is listening, and a subscriber that falls behind loses
//! the oldest events.

use std::fmt::Display;

use tokio::{
    sync::broadcast::{self, Receiver, Sender, error::RecvError},
    task::JoinHandle,
};

use crate::{date_range::DateRange, money::Money, stores::AccountSelection};

/// The number of events buffered per subscriber when none is configured.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Something that happened while serving reports.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    IncomeStatementGenerated {
        period: DateRange,
        net: Money,
        /// Whether the statement includes a monthly breakdown.
        monthly: bool,
    },
    CashflowStatementGenerated {
        period: DateRange,
        account: AccountSelection,
        net: Money,
        monthly: bool,
    },
}

impl Display for ReportEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportEvent::IncomeStatementGenerated {
                period,
                net,
                monthly,
            } => write!(
                f,
                "income statement generated for {period} (net {net}, monthly: {monthly})"
            ),
            ReportEvent::CashflowStatementGenerated {
                period,
                account,
                net,
                monthly,
            } => write!(
                f,
                "cashflow statement generated for account {account} over {period} \
                (net {net}, monthly: {monthly})"
            ),
        }
    }
}

/// Publishes [ReportEvent]s to any number of subscribers.
#[derive(Debug, Clone)]
pub struct ReportEvents {
    sender: Sender<ReportEvent>,
}

impl ReportEvents {
    /// Create a publisher that buffers up to `capacity` events per subscriber.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));

        Self { sender }
    }

    /// Send `event` to the current subscribers without waiting.
    pub fn publish(&self, event: ReportEvent) {
        match self.sender.send(event) {
            Ok(receiver_count) => {
                tracing::debug!("published report event to {receiver_count} subscriber(s)")
            }
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!("no subscribers, dropping report event: {event}")
            }
        }
    }

    pub fn subscribe(&self) -> Receiver<ReportEvent> {
        self.sender.subscribe()
    }
}

impl Default for ReportEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Wait for the next event, skipping over any events lost by lagging behind.
///
/// Returns `None` once every publisher has been dropped.
pub async fn next_event(receiver: &mut Receiver<ReportEvent>) -> Option<ReportEvent> {
    loop {
        match receiver.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("report event subscriber fell behind, skipped {skipped} event(s)");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Spawn a task that logs every published event.
pub fn spawn_event_logger(events: &ReportEvents) -> JoinHandle<()> {
    let mut receiver = events.subscribe();

    tokio::spawn(async move {
        while let Some(event) = next_event(&mut receiver).await {
            tracing::info!("{event}");
        }

        tracing::debug!("report event publisher closed, stopping event logger");
    })
}
