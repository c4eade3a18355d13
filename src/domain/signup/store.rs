use std::fmt;
use std::future::Future;
use std::pin::Pin;

use super::signup_record::SignupRecord;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug)]
pub enum CreateSignupError {
    /// The store already holds an item with the same key.
    DuplicateKey,
    Store(anyhow::Error),
}

impl fmt::Display for CreateSignupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateSignupError::DuplicateKey => write!(f, "signup with this key already exists"),
            CreateSignupError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for CreateSignupError {}

/// What the startup probe learned about the backing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatus {
    pub table_name: String,
    pub status: String,
    pub item_count: Option<i64>,
}

pub trait SignupStore: Send + Sync + 'static {
    /// Inserts the record unless an item with the same key exists.
    fn create<'a>(
        &'a self,
        record: &'a SignupRecord,
    ) -> BoxFuture<'a, Result<(), CreateSignupError>>;

    fn describe(&self) -> BoxFuture<'_, anyhow::Result<TableStatus>>;
}
