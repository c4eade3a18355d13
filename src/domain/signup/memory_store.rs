use anyhow::anyhow;

use super::signup_record::SignupRecord;
use super::store::{BoxFuture, CreateSignupError, SignupStore, TableStatus};

/// Process-local signup table keyed by one identity attribute.
pub struct InMemorySignupStore {
    table_name: String,
    key_attribute: String,
    items: scc::HashMap<String, SignupRecord>,
}

impl InMemorySignupStore {
    pub fn new(table_name: impl Into<String>, key_attribute: impl Into<String>) -> Self {
        InMemorySignupStore {
            table_name: table_name.into(),
            key_attribute: key_attribute.into(),
            items: scc::HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    async fn insert(&self, record: &SignupRecord) -> Result<(), CreateSignupError> {
        let key = record.get(&self.key_attribute).ok_or_else(|| {
            CreateSignupError::Store(anyhow!(
                "record is missing key attribute `{}`",
                self.key_attribute
            ))
        })?;

        // DynamoDB refuses empty strings in key attributes
        if key.is_empty() {
            return Err(CreateSignupError::Store(anyhow!(
                "key attribute `{}` must not be empty",
                self.key_attribute
            )));
        }

        self.items
            .insert_async(key.to_owned(), record.clone())
            .await
            .map_err(|_| CreateSignupError::DuplicateKey)
    }
}

impl SignupStore for InMemorySignupStore {
    fn create<'a>(
        &'a self,
        record: &'a SignupRecord,
    ) -> BoxFuture<'a, Result<(), CreateSignupError>> {
        Box::pin(self.insert(record))
    }

    fn describe(&self) -> BoxFuture<'_, anyhow::Result<TableStatus>> {
        Box::pin(async move {
            Ok(TableStatus {
                table_name: self.table_name.clone(),
                status: "ACTIVE".to_string(),
                item_count: i64::try_from(self.len()).ok(),
            })
        })
    }
}
