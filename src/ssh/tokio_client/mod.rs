//! An asynchronous high level SSH client for the tokio runtime, built on
//! russh and russh-sftp.
//!
//! The heart of this module is [`Client`]. Use it to connect, authenticate,
//! execute commands and open sftp sessions.

pub mod authentication;
pub mod channel_manager;
pub mod connection;
pub mod error;
pub mod file_transfer;

pub use authentication::{AuthMethod, ServerCheckMethod};
pub use channel_manager::CommandExecutedResult;
pub use connection::{Client, ClientHandler};
pub use error::Error;
pub use file_transfer::{download_file, upload_file};

pub use russh::client::Config;
