use async_trait::async_trait;
use cwt_core::repository::{ConfirmationRequest, NotificationSink, StoreError};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{error, info};

#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
}

impl EventProducer {
    pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }

    pub async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &str,
    ) -> Result<(), rdkafka::error::KafkaError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(0)))
            .await
        {
            Ok(delivery) => {
                let partition = delivery.partition;
                let offset = delivery.offset;
                info!(
                    "Sent message to {}/{}: partition {} offset {}",
                    topic, key, partition, offset
                );
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to send message to {}: {}", topic, e);
                Err(e)
            }
        }
    }
}

/// Fire-and-forget confirmation dispatch over Kafka. The notification
/// service consumes the topic and sends the actual email; the coordinator
/// only sees success or failure of the publish.
pub struct KafkaNotifier {
    producer: EventProducer,
    topic: String,
}

impl KafkaNotifier {
    pub fn new(producer: EventProducer, topic: impl Into<String>) -> Self {
        Self {
            producer,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for KafkaNotifier {
    async fn send(&self, request: &ConfirmationRequest) -> Result<(), StoreError> {
        let payload = serde_json::to_string(request)
            .map_err(|e| StoreError::Unavailable(format!("serialize confirmation: {}", e)))?;

        self.producer
            .publish(&self.topic, &request.booking_number, &payload)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}
