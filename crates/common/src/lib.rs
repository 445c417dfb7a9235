pub mod actors;
pub mod logger;
pub mod models;
pub mod oracle;
