use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::Bot;
use tracing::{debug, error, info};

use common::actors::{Actor, ActorType};
use common::logger;
use common::oracle::PriceOracle;
use market_data::remote::BinanceClient;
use signals::SignalParser;

use crate::actors::supervisor::Supervisor;
use crate::config::RelayConfig;
use crate::services::health_service::HealthService;
use crate::services::relay_service::RelayService;
use crate::services::telegram_service::TelegramService;

mod actors;
mod config;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger(&config::log_level_from_env());
    debug!("System starting up...");

    let config = RelayConfig::from_env().inspect_err(|e| error!("Invalid configuration: {}", e))?;
    info!("Loaded {:?}", config);

    let oracle: Arc<dyn PriceOracle> = Arc::new(BinanceClient::new(config.binance_base_url.clone())?);
    let bot = Bot::new(config.bot_token.clone());
    let relay = Arc::new(RelayService::new(
        SignalParser::new(oracle),
        Arc::new(bot.clone()),
        config.target_chat.clone(),
    ));

    let mut supervisor = Supervisor::new();

    let source = config.source_chat.clone();
    supervisor.register_actor(
        ActorType::RelayActor,
        Box::new(move || -> Box<dyn Actor> {
            Box::new(TelegramService::new(bot.clone(), relay.clone(), source.clone()))
        }),
    );

    let port = config.port;
    supervisor.register_actor(
        ActorType::HealthActor,
        Box::new(move || -> Box<dyn Actor> { Box::new(HealthService::new(port)) }),
    );

    supervisor.start().await;
    info!("Stopping...");
    Ok(())
}
