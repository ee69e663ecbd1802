//! Connection configuration.
use std::env::var;

use crate::{common::ByteStr, frame::DEFAULT_MAX_MESSAGE_SIZE};

/// Connection config.
///
/// All configuration travels through this struct; there is no config file.
#[derive(Clone, Debug)]
pub struct Config {
    /// Server host, an IP address or resolvable name.
    pub host: ByteStr,
    /// Server port.
    pub port: u16,
    /// Client identification sent with INIT.
    pub user_agent: ByteStr,
    /// Largest reassembled message [`receive`][crate::Connection::receive]
    /// will accept.
    pub max_message_size: usize,
}

impl Config {
    pub fn new(host: &str, port: u16) -> Config {
        Config {
            host: ByteStr::copy_from_str(host),
            port,
            ..Config::default()
        }
    }

    /// Retrieve configuration from environment variable.
    ///
    /// It reads:
    /// - `BOLT_HOST`
    /// - `BOLT_PORT`
    /// - `BOLT_USER_AGENT`
    ///
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Config {
        let mut config = Config::default();
        if let Ok(host) = var("BOLT_HOST") {
            config.host = host.into();
        }
        if let Ok(port) = var("BOLT_PORT") {
            config.port = port.parse().unwrap_or(DEFAULT_PORT);
        }
        if let Ok(user_agent) = var("BOLT_USER_AGENT") {
            config.user_agent = user_agent.into();
        }
        config
    }
}

const DEFAULT_PORT: u16 = 7687;

impl Default for Config {
    fn default() -> Self {
        Config {
            host: ByteStr::from_static("127.0.0.1"),
            port: DEFAULT_PORT,
            user_agent: ByteStr::from_static(concat!("boltro/", env!("CARGO_PKG_VERSION"))),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}
