use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use log::{debug, error};

use super::{Notification, NotificationStream, Subject};

#[async_trait]
pub trait EventService {
    async fn subscribe(&self, s: &Subject) -> super::Result<NotificationStream>;

    async fn publish(&self, s: &Subject, n: &Notification);

    async fn broadcast(&self, subjects: &[Subject], n: &Notification) {
        for s in subjects {
            self.publish(s, n).await;
        }
    }
}

#[derive(Clone)]
pub struct EventServiceImpl {
    pubsub: async_nats::Client,
}

impl EventServiceImpl {
    pub fn new(pubsub: async_nats::Client) -> Self {
        Self { pubsub }
    }
}

#[async_trait]
impl EventService for EventServiceImpl {
    async fn subscribe(&self, s: &Subject) -> super::Result<NotificationStream> {
        let mut subscriber = self.pubsub.subscribe(s).await?;

        let stream = async_stream::stream! {
            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<Notification>(&msg.payload) {
                    Ok(n) => yield n,
                    Err(e) => error!("failed to deserialize notification: {e:?}"),
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn publish(&self, s: &Subject, n: &Notification) {
        debug!("publishing to {s}: {n:?}");
        if let Err(e) = self.pubsub.publish(s, Bytes::from(n)).await {
            error!("failed to publish to {s}: {e:?}");
        }
    }
}

#[cfg(test)]
pub mod test {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::event::{Notification, NotificationStream, Subject};

    use super::EventService;

    #[derive(Default)]
    pub struct RecordingEventService {
        published: Mutex<Vec<(Subject, Notification)>>,
    }

    impl RecordingEventService {
        pub fn published(&self) -> Vec<(Subject, Notification)> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventService for RecordingEventService {
        async fn subscribe(&self, _: &Subject) -> crate::event::Result<NotificationStream> {
            Ok(Box::pin(futures::stream::empty()))
        }

        async fn publish(&self, s: &Subject, n: &Notification) {
            self.published.lock().unwrap().push((s.clone(), n.clone()));
        }
    }
}
