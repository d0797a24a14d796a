use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Startup and serve errors for the tickersnap binary.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid bind address '{value}' (expected host:port)")]
    InvalidBindAddr { value: String },

    #[error("invalid provider timeout '{value}' (expected milliseconds)")]
    InvalidTimeout { value: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server terminated: {0}")]
    Serve(#[source] io::Error),
}
