pub mod dynamo_store;
pub mod memory_store;
pub mod signup_record;
pub mod store;

pub use dynamo_store::DynamoSignupStore;
pub use memory_store::InMemorySignupStore;
pub use signup_record::SignupRecord;
pub use store::{CreateSignupError, SignupStore, TableStatus};
