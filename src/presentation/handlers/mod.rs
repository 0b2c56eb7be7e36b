mod analyze;
mod ask;
mod health;
mod statistics;

pub use analyze::analyze_handler;
pub use ask::ask_handler;
pub use health::health_handler;
pub use statistics::statistics_handler;
