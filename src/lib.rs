//! Bolt Graph Database Driver
//!
//! A synchronous client for the Bolt binary protocol: PackStream value
//! serialization, chunked message framing, and a pipelined
//! request/response connection.
//!
//! # Examples
//!
//! ```no_run
//! use boltro::{Config, Connection, Signature, Value};
//!
//! # fn app() -> boltro::Result<()> {
//! let config = Config::from_env();
//! let mut conn = Connection::connect(&config)?;
//!
//! conn.init(&config.user_agent)?;
//! conn.send()?;
//! conn.receive()?;
//!
//! let parameters = [("n", Value::Integer(420))];
//! conn.run("RETURN $n", &parameters)?;
//! conn.pull_all()?;
//! conn.send()?;
//!
//! conn.receive()?; // statement accepted, metadata names the columns
//!
//! while conn.receive()? == Signature::Record {
//!     let record = conn.next_value()?;
//!     println!("{record:?}");
//! }
//!
//! conn.disconnect();
//! # Ok(())
//! # }
//! ```

pub mod common;
mod channel;

// Encoding
pub mod value;
pub mod packstream;

// Protocol
pub mod frame;
pub mod message;

// Connection
mod config;
pub mod connection;

mod error;


pub use channel::{Channel, TcpChannel};
pub use common::ByteStr;
pub use config::Config;
pub use connection::{Connection, HandshakeError};
pub use message::Signature;
pub use value::{Kind, Value};
pub use error::{Error, ErrorKind, Result};
