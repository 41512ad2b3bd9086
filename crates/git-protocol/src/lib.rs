//! Git wire protocol implementation.
//!
//! This crate implements the git wire protocol for fetch operations: pkt-line
//! framing, capability negotiation, v1/v2 protocol exchanges, and remote
//! configuration. Push is local-peer only (see [`local::push_local`]) —
//! pushing over the smart protocol (send-pack/receive-pack) is not
//! supported.

pub mod bundle;
pub mod capability;
pub mod fetch;
pub mod local;
pub mod pktline;
pub mod remote;
pub mod sideband;
pub mod v1;
pub mod v2;

use git_hash::ObjectId;
use git_transport::TransportError;

/// Errors that can occur during protocol operations.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid pkt-line: {0}")]
    InvalidPktLine(String),

    #[error("object {0} referenced but missing from source store")]
    MissingObject(ObjectId),

    #[error(transparent)]
    Odb(#[from] git_odb::OdbError),

    #[error(transparent)]
    Repo(#[from] git_repository::RepoError),

    #[error(transparent)]
    RevWalk(#[from] git_revwalk::RevWalkError),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("server error: {0}")]
    ServerError(String),

    #[error("unsupported capability: {0}")]
    UnsupportedCapability(String),

    #[error("invalid refspec: {0}")]
    InvalidRefSpec(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Pack(#[from] git_pack::PackError),

    #[error(transparent)]
    Ref(#[from] git_ref::RefError),

    #[error(transparent)]
    Config(#[from] git_config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
