use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Store error: {0}")]
    Store(#[from] filefind_store::StoreError),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] filefind_vector_store::VectorStoreError),

    #[error("{0}")]
    Other(String),
}
