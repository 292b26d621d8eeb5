pub mod caller;
pub mod config;
pub mod error;
pub mod db;
pub mod intake;
pub mod jobs;
pub mod gateway;
pub mod http;

pub use caller::CallerContext;
pub use config::Config;
pub use error::{GatewayError, Result};
pub use gateway::{build_gateway, Gateway};
