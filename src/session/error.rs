use super::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to resolve `{endpoint}`: {source}"))]
    Resolve { endpoint: String, source: io::Error },

    #[snafu(display("Connection timeout: {source}"))]
    Timeout { source: tokio::time::error::Elapsed },

    #[snafu(display("IO error: {source}"))]
    Io { source: io::Error },

    #[snafu(display("Serialization error: {source}"))]
    Serialization { source: serde_json::Error },

    #[snafu(display("Not connected"))]
    NotConnected,

    #[snafu(display("Session actor has shut down"))]
    ActorGone,
}
