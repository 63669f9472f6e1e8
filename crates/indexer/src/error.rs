use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Store error: {0}")]
    Store(#[from] filefind_store::StoreError),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] filefind_vector_store::VectorStoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
