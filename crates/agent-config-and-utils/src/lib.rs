//! Configuration, file system paths and logging setup for race-agent.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    default_locale, Config, DEFAULT_LOCALE, DEFAULT_LOG_LEVEL, DEFAULT_OBJECT_PATH,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
