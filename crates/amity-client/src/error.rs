use amity_shared::RecordError;
use amity_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The store rejected a read or write. The operation was abandoned.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A multi-object operation failed after some of its writes landed.
    #[error("{completed}, but the next step failed: {source}")]
    PartialFailure {
        completed: &'static str,
        source: StoreError,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No conversation selected")]
    NoConversation,

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Invalid picture data: {0}")]
    Picture(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
