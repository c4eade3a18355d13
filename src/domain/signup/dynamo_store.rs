use std::collections::HashMap;

use anyhow::anyhow;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_types::region::Region;
use tracing::debug;

use crate::init::config::AppConfig;

use super::signup_record::SignupRecord;
use super::store::{BoxFuture, CreateSignupError, SignupStore, TableStatus};

pub struct DynamoSignupStore {
    client: Client,
    table_name: String,
}

impl DynamoSignupStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        DynamoSignupStore {
            client,
            table_name: table_name.into(),
        }
    }

    /// Builds the SDK client from the configured region. SDK-level retries are
    /// turned off; a failed call fails the request.
    pub async fn from_config(config: &AppConfig) -> Self {
        let region_provider =
            RegionProviderChain::first_try(Region::new(config.aws_region.clone()))
                .or_default_provider();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(RetryConfig::disabled());

        if let Some(endpoint_url) = &config.dynamodb_endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        let sdk_config = loader.load().await;

        Self::new(Client::new(&sdk_config), config.signup_table.clone())
    }

    async fn put(&self, record: &SignupRecord) -> Result<(), CreateSignupError> {
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(record)));

        if let Some((condition, names)) = put_condition(record) {
            request = request
                .condition_expression(condition)
                .set_expression_attribute_names(Some(names));
        }

        match request.send().await {
            Ok(_) => {
                debug!(
                    table = %self.table_name,
                    attributes = record.len(),
                    "Signup item stored"
                );
                Ok(())
            }
            Err(e) => {
                let is_duplicate = e
                    .as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false);
                if is_duplicate {
                    Err(CreateSignupError::DuplicateKey)
                } else {
                    Err(CreateSignupError::Store(anyhow!(
                        "PutItem on {} failed: {}",
                        self.table_name,
                        DisplayErrorContext(&e)
                    )))
                }
            }
        }
    }

    async fn describe_table(&self) -> anyhow::Result<TableStatus> {
        let output = self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| {
                anyhow!(
                    "DescribeTable on {} failed: {}",
                    self.table_name,
                    DisplayErrorContext(&e)
                )
            })?;

        let table = output
            .table()
            .ok_or_else(|| anyhow!("DescribeTable returned no table description"))?;

        Ok(TableStatus {
            table_name: table
                .table_name()
                .unwrap_or(self.table_name.as_str())
                .to_string(),
            status: table
                .table_status()
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            item_count: table.item_count(),
        })
    }
}

impl SignupStore for DynamoSignupStore {
    fn create<'a>(
        &'a self,
        record: &'a SignupRecord,
    ) -> BoxFuture<'a, Result<(), CreateSignupError>> {
        Box::pin(self.put(record))
    }

    fn describe(&self) -> BoxFuture<'_, anyhow::Result<TableStatus>> {
        Box::pin(self.describe_table())
    }
}

fn record_to_item(record: &SignupRecord) -> HashMap<String, AttributeValue> {
    record
        .iter()
        .map(|(k, v)| (k.to_owned(), AttributeValue::S(v.to_owned())))
        .collect()
}

/// Every submitted attribute must be absent on the stored item. Any existing
/// item under the same key carries at least the key attribute, so the write is
/// rejected with a conditional-check failure.
fn put_condition(record: &SignupRecord) -> Option<(String, HashMap<String, String>)> {
    if record.is_empty() {
        return None;
    }

    let mut names = HashMap::with_capacity(record.len());
    let clauses: Vec<String> = record
        .iter()
        .enumerate()
        .map(|(i, (attribute, _))| {
            let placeholder = format!("#a{i}");
            let clause = format!("attribute_not_exists({placeholder})");
            names.insert(placeholder, attribute.to_owned());
            clause
        })
        .collect();

    Some((clauses.join(" AND "), names))
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::operation::describe_table::{DescribeTableError, DescribeTableOutput};
    use aws_sdk_dynamodb::operation::put_item::{PutItemError, PutItemOutput};
    use aws_sdk_dynamodb::types::error::{
        ConditionalCheckFailedException, ResourceNotFoundException,
    };
    use aws_sdk_dynamodb::types::{TableDescription, TableStatus as DynamoTableStatus};
    use aws_smithy_mocks::{RuleMode, mock, mock_client};
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(pairs: &[(&str, &str)]) -> SignupRecord {
        SignupRecord::from_pairs(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[test]
    fn every_field_becomes_a_string_attribute() {
        let item = record_to_item(&record(&[("email", "a@example.com"), ("name", "Alice")]));

        assert_eq!(item.len(), 2);
        assert_eq!(
            item.get("email"),
            Some(&AttributeValue::S("a@example.com".to_string()))
        );
        assert_eq!(item.get("name"), Some(&AttributeValue::S("Alice".to_string())));
    }

    #[test]
    fn condition_requires_all_attributes_absent() {
        let (condition, names) =
            put_condition(&record(&[("email", "a@example.com"), ("name", "Alice")])).unwrap();

        assert_eq!(
            condition,
            "attribute_not_exists(#a0) AND attribute_not_exists(#a1)"
        );
        assert_eq!(names.get("#a0").map(String::as_str), Some("email"));
        assert_eq!(names.get("#a1").map(String::as_str), Some("name"));
    }

    #[test]
    fn empty_record_has_no_condition() {
        assert!(put_condition(&SignupRecord::default()).is_none());
    }

    #[tokio::test]
    async fn conditional_check_failure_becomes_duplicate_key() {
        let stored = mock!(Client::put_item)
            .match_requests(|req| {
                req.table_name() == Some("signups") && req.condition_expression().is_some()
            })
            .then_output(|| PutItemOutput::builder().build());
        let rejected = mock!(Client::put_item).then_error(|| {
            PutItemError::ConditionalCheckFailedException(
                ConditionalCheckFailedException::builder()
                    .message("The conditional request failed")
                    .build(),
            )
        });
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::Sequential, [&stored, &rejected]);
        let store = DynamoSignupStore::new(client, "signups");
        let signup = record(&[("email", "a@example.com"), ("name", "Alice")]);

        assert!(store.create(&signup).await.is_ok());
        let err = store.create(&signup).await.unwrap_err();

        assert!(matches!(err, CreateSignupError::DuplicateKey));
    }

    #[tokio::test]
    async fn other_service_errors_become_store_errors() {
        let missing_table = mock!(Client::put_item).then_error(|| {
            PutItemError::ResourceNotFoundException(
                ResourceNotFoundException::builder()
                    .message("Requested resource not found")
                    .build(),
            )
        });
        let client = mock_client!(aws_sdk_dynamodb, [&missing_table]);
        let store = DynamoSignupStore::new(client, "signups");

        let err = store
            .create(&record(&[("email", "a@example.com")]))
            .await
            .unwrap_err();

        match err {
            CreateSignupError::Store(e) => assert!(e.to_string().contains("signups")),
            CreateSignupError::DuplicateKey => panic!("a missing table is not a duplicate"),
        }
    }

    #[tokio::test]
    async fn describe_failure_is_an_error() {
        let missing = mock!(Client::describe_table).then_error(|| {
            DescribeTableError::ResourceNotFoundException(
                ResourceNotFoundException::builder()
                    .message("Requested resource not found")
                    .build(),
            )
        });
        let client = mock_client!(aws_sdk_dynamodb, [&missing]);
        let store = DynamoSignupStore::new(client, "signups");

        assert!(store.describe().await.is_err());
    }

    #[tokio::test]
    async fn describe_reports_table_status() {
        let active = mock!(Client::describe_table).then_output(|| {
            DescribeTableOutput::builder()
                .table(
                    TableDescription::builder()
                        .table_name("signups")
                        .table_status(DynamoTableStatus::Active)
                        .item_count(3)
                        .build(),
                )
                .build()
        });
        let client = mock_client!(aws_sdk_dynamodb, [&active]);
        let store = DynamoSignupStore::new(client, "signups");

        let status = store.describe().await.unwrap();

        assert_eq!(
            status,
            TableStatus {
                table_name: "signups".to_string(),
                status: "ACTIVE".to_string(),
                item_count: Some(3),
            }
        );
    }
}
