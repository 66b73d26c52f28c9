pub mod known_hosts;
pub mod session;
pub mod sftp;
pub mod tokio_client;

pub use known_hosts::HostKeyPolicy;
pub use session::{
    CommandOutput, Connector, EntryKind, RemoteEntry, RemoteMetadata, Session, TransferChannel,
};
pub use sftp::SshConnector;
