pub mod config;
pub mod error;
pub mod routes;

pub use config::{Config, StoreBackend, TopicBackend};
pub use error::TaplineError;
pub use routes::TopicRoute;
