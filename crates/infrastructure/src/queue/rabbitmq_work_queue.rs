use async_trait::async_trait;
use dnsbl_application::ports::{Delivery, WorkQueue};
use dnsbl_domain::{DomainError, QueueMessage};
use lapin::options::{
    BasicAckOptions, BasicGetOptions, BasicNackOptions, BasicPublishOptions, BasicQosOptions,
    QueueDeclareOptions, QueuePurgeOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tracing::{error, instrument};

/// `WorkQueue` adapter over RabbitMQ via `lapin`. Treated purely as a
/// transport: nothing beyond `Delivery`/`QueueMessage` ever crosses
/// into `dnsbl-application` or `dnsbl-jobs`.
pub struct RabbitMqWorkQueue {
    _connection: Connection,
    channel: Channel,
    queue_name: String,
}

impl RabbitMqWorkQueue {
    pub async fn connect(
        amqp_url: &str,
        queue_name: impl Into<String>,
        prefetch: u16,
    ) -> Result<Self, DomainError> {
        let connection = Connection::connect(amqp_url, ConnectionProperties::default())
            .await
            .map_err(|e| DomainError::BrokerError(format!("failed to connect: {e}")))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| DomainError::BrokerError(format!("failed to open channel: {e}")))?;

        channel
            .basic_qos(prefetch, BasicQosOptions::default())
            .await
            .map_err(|e| DomainError::BrokerError(format!("failed to set prefetch: {e}")))?;

        Ok(Self { _connection: connection, channel, queue_name: queue_name.into() })
    }
}

#[async_trait]
impl WorkQueue for RabbitMqWorkQueue {
    #[instrument(skip(self))]
    async fn initialize(&self) -> Result<(), DomainError> {
        self.channel
            .queue_declare(&self.queue_name, QueueDeclareOptions {
                durable: true,
                ..Default::default()
            }, FieldTable::default())
            .await
            .map_err(|e| {
                error!(error = %e, "failed to declare queue");
                DomainError::BrokerError(e.to_string())
            })?;
        Ok(())
    }

    #[instrument(skip(self, messages))]
    async fn publish(&self, messages: &[QueueMessage]) -> Result<(), DomainError> {
        for message in messages {
            let payload = message.to_json().map_err(|e| {
                DomainError::BrokerError(format!("failed to encode queue message: {e}"))
            })?;

            self.channel
                .basic_publish(
                    "",
                    &self.queue_name,
                    BasicPublishOptions::default(),
                    &payload,
                    BasicProperties::default().with_delivery_mode(2),
                )
                .await
                .map_err(|e| {
                    error!(error = %e, "failed to publish message");
                    DomainError::BrokerError(e.to_string())
                })?
                .await
                .map_err(|e| {
                    error!(error = %e, "publisher confirm failed");
                    DomainError::BrokerError(e.to_string())
                })?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn purge(&self) -> Result<u64, DomainError> {
        let message_count = self
            .channel
            .queue_purge(&self.queue_name, QueuePurgeOptions::default())
            .await
            .map_err(|e| {
                error!(error = %e, "failed to purge queue");
                DomainError::BrokerError(e.to_string())
            })?;
        Ok(message_count as u64)
    }

    #[instrument(skip(self))]
    async fn receive(&self) -> Result<Option<Delivery>, DomainError> {
        let got = self
            .channel
            .basic_get(&self.queue_name, BasicGetOptions::default())
            .await
            .map_err(|e| {
                error!(error = %e, "failed to pull message");
                DomainError::BrokerError(e.to_string())
            })?;

        match got {
            Some(get_message) => {
                let message = QueueMessage::from_json(&get_message.data).map_err(|e| {
                    DomainError::BrokerError(format!("malformed queue message: {e}"))
                })?;
                Ok(Some(Delivery { tag: get_message.delivery_tag, message }))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn ack(&self, tag: u64) -> Result<(), DomainError> {
        self.channel
            .basic_ack(tag, BasicAckOptions::default())
            .await
            .map_err(|e| DomainError::BrokerError(format!("ack failed: {e}")))
    }

    #[instrument(skip(self))]
    async fn nack(&self, tag: u64, requeue: bool) -> Result<(), DomainError> {
        self.channel
            .basic_nack(tag, BasicNackOptions { requeue, ..Default::default() })
            .await
            .map_err(|e| DomainError::BrokerError(format!("nack failed: {e}")))
    }

    #[instrument(skip(self))]
    async fn message_count(&self) -> Result<u64, DomainError> {
        let queue = self
            .channel
            .queue_declare(
                &self.queue_name,
                QueueDeclareOptions { passive: true, ..Default::default() },
                FieldTable::default(),
            )
            .await
            .map_err(|e| DomainError::BrokerError(format!("failed to inspect queue: {e}")))?;
        Ok(queue.message_count() as u64)
    }
}
