pub mod collectors;
pub mod crawler;
pub mod handler;
pub mod pagination;

pub use collectors::{Collector, CollectorSet};
pub use crawler::Crawler;
pub use handler::MessageHandler;
