use std::sync::Arc;

use anyhow::{Context, bail};
use async_trait::async_trait;
use common::actors::{Actor, ActorType, ControlMessage};
use teloxide::{prelude::*, types::Recipient};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::{
    config::ChatRef,
    services::relay_service::{Delivery, RelayService},
};

impl From<&ChatRef> for Recipient {
    fn from(chat: &ChatRef) -> Self {
        match chat {
            ChatRef::Id(id) => Recipient::Id(ChatId(*id)),
            ChatRef::Handle(handle) => Recipient::ChannelUsername(handle.clone()),
        }
    }
}

#[async_trait]
impl Delivery for Bot {
    async fn deliver(&self, target: &ChatRef, body: &str) -> anyhow::Result<()> {
        self.send_message(Recipient::from(target), body)
            .await
            .with_context(|| format!("send_message to {}", target))?;
        Ok(())
    }
}

/// Which chats are relayed; `None` accepts every chat the bot sees.
#[derive(Debug, Clone)]
pub struct SourceFilter(pub Option<ChatRef>);

impl SourceFilter {
    pub fn accepts(&self, chat_id: i64, username: Option<&str>) -> bool {
        self.0
            .as_ref()
            .is_none_or(|source| source.matches(chat_id, username))
    }
}

/// Message body and caption joined the way the parser expects them.
pub fn raw_text(text: Option<&str>, caption: Option<&str>) -> String {
    format!("{} {}", text.unwrap_or_default(), caption.unwrap_or_default())
}

async fn on_message(
    msg: Message,
    relay: Arc<RelayService>,
    source: SourceFilter,
) -> ResponseResult<()> {
    if !source.accepts(msg.chat.id.0, msg.chat.username()) {
        return respond(());
    }

    let text = raw_text(msg.text(), msg.caption());

    // A panic while handling one message must not take the listener down.
    let task = tokio::spawn(async move { relay.handle(&text).await });
    if let Err(e) = task.await {
        error!("Error handling message: {}", e);
    }

    respond(())
}

pub struct TelegramService {
    bot: Bot,
    relay: Arc<RelayService>,
    source: SourceFilter,
}

#[async_trait]
impl Actor for TelegramService {
    fn name(&self) -> ActorType {
        ActorType::RelayActor
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let heartbeat_handle = self.spawn_heartbeat(supervisor_tx.clone());

        let me = match self.bot.get_me().await {
            Ok(me) => me,
            Err(e) => {
                heartbeat_handle.abort();
                supervisor_tx
                    .send(ControlMessage::Error(
                        self.name(),
                        format!("{:?}: Telegram login failed: {}", self.name(), e),
                    ))
                    .await?;
                bail!("Telegram login failed: {}", e);
            }
        };
        info!(
            "Telegram client started as @{}",
            me.user.username.as_deref().unwrap_or("unknown")
        );
        info!(
            "Listening... (source={} -> target={})",
            self.source
                .0
                .as_ref()
                .map_or_else(|| "any".to_string(), |c| c.to_string()),
            self.relay
                .target()
                .map_or_else(|| "none".to_string(), |c| c.to_string()),
        );

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(on_message))
            .branch(Update::filter_channel_post().endpoint(on_message));

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self.relay.clone(), self.source.clone()])
            .default_handler(|_| async {})
            .build()
            .dispatch()
            .await;

        heartbeat_handle.abort();
        supervisor_tx
            .send(ControlMessage::Error(
                self.name(),
                format!("{:?}: Telegram dispatcher stopped", self.name()),
            ))
            .await?;
        bail!("Telegram dispatcher stopped")
    }
}

impl TelegramService {
    pub fn new(bot: Bot, relay: Arc<RelayService>, source: Option<ChatRef>) -> Self {
        Self {
            bot,
            relay,
            source: SourceFilter(source),
        }
    }
}
