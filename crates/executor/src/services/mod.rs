pub mod health_service;
pub mod relay_service;
pub mod telegram_service;
