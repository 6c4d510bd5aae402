use async_trait::async_trait;
use dnsbl_domain::{DomainError, QueueMessage};

/// A message pulled off the queue, carrying the delivery tag needed to
/// ack/nack it once the worker has probed it.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub tag: u64,
    pub message: QueueMessage,
}

/// The ephemeral materialization of the ledger's `pending` subset
/// (C3). Purge-then-republish makes synchronization idempotent.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    async fn initialize(&self) -> Result<(), DomainError>;

    async fn publish(&self, messages: &[QueueMessage]) -> Result<(), DomainError>;

    /// Empties the queue outright; used by the synchronizer before
    /// republishing so a stale backlog never survives a resync.
    async fn purge(&self) -> Result<u64, DomainError>;

    /// Pulls the next available message, or `None` if none is ready
    /// within the adapter's internal wait.
    async fn receive(&self) -> Result<Option<Delivery>, DomainError>;

    async fn ack(&self, tag: u64) -> Result<(), DomainError>;

    async fn nack(&self, tag: u64, requeue: bool) -> Result<(), DomainError>;

    /// Broker-reported message count, used by the synchronizer to
    /// verify its publish post-condition (§4.5 step 7).
    async fn message_count(&self) -> Result<u64, DomainError>;
}
