use std::sync::Arc;

use async_trait::async_trait;
use signals::{SignalParser, render};
use tracing::{debug, error, info, warn};

use crate::config::ChatRef;

const PREVIEW_CHARS: usize = 200;

/// Destination side of the relay.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, target: &ChatRef, body: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered,
    NoTarget,
    Failed,
}

/// Single-line, length-capped view of a message for the logs.
pub fn preview(text: &str) -> String {
    text.chars()
        .take(PREVIEW_CHARS)
        .collect::<String>()
        .replace('\n', " ")
}

/// Parse, render and forward one message. Holds no mutable state, so any
/// number of messages may be in flight at once.
pub struct RelayService {
    parser: SignalParser,
    delivery: Arc<dyn Delivery>,
    target: Option<ChatRef>,
}

impl RelayService {
    pub fn new(parser: SignalParser, delivery: Arc<dyn Delivery>, target: Option<ChatRef>) -> Self {
        Self {
            parser,
            delivery,
            target,
        }
    }

    pub fn target(&self) -> Option<&ChatRef> {
        self.target.as_ref()
    }

    pub async fn handle(&self, text: &str) -> RelayOutcome {
        info!("New message: {}", preview(text));

        let signal = self.parser.parse(text).await;
        debug!("Parsed signal: {:?}", signal);
        let body = render(&signal);

        let Some(target) = &self.target else {
            warn!("No TARGET_CHAT configured");
            return RelayOutcome::NoTarget;
        };

        // Delivery failures drop the message, the listener keeps going.
        match self.delivery.deliver(target, &body).await {
            Ok(()) => {
                info!("Sent to {}", target);
                RelayOutcome::Delivered
            }
            Err(e) => {
                error!("Failed to deliver signal to {}: {:?}", target, e);
                RelayOutcome::Failed
            }
        }
    }
}
