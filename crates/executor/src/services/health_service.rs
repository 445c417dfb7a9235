use std::net::SocketAddr;

use anyhow::bail;
use async_trait::async_trait;
use axum::{Router, routing::get};
use common::actors::{Actor, ActorType, ControlMessage};
use tokio::{net::TcpListener, sync::mpsc};
use tracing::info;

pub const KEEPALIVE_BODY: &str = "OK - signal copier is running";

async fn home() -> &'static str {
    KEEPALIVE_BODY
}

pub fn router() -> Router {
    Router::new().route("/", get(home))
}

/// Liveness endpoint for external health checks. Independent of the relay.
pub struct HealthService {
    port: u16,
}

#[async_trait]
impl Actor for HealthService {
    fn name(&self) -> ActorType {
        ActorType::HealthActor
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let heartbeat_handle = self.spawn_heartbeat(supervisor_tx.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                heartbeat_handle.abort();
                supervisor_tx
                    .send(ControlMessage::Error(
                        self.name(),
                        format!("{:?}: Failed to bind {}: {}", self.name(), addr, e),
                    ))
                    .await?;
                bail!("Failed to bind {}: {}", addr, e);
            }
        };

        info!("Keepalive endpoint listening on {}", addr);
        let result = axum::serve(listener, router()).await;

        heartbeat_handle.abort();
        supervisor_tx
            .send(ControlMessage::Error(
                self.name(),
                format!("{:?}: Keepalive server stopped: {:?}", self.name(), result),
            ))
            .await?;
        bail!("Keepalive server stopped: {:?}", result)
    }
}

impl HealthService {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}
