//! Shared test utilities for domain testing
//!
//! - `TestMongo`: MongoDB container with automatic cleanup
//! - `TestDataBuilder`: deterministic test data derived from the test name
//!
//! ```rust,no_run
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! # async fn example() {
//! let mongo = TestMongo::new().await;
//! let builder = TestDataBuilder::from_test_name("create_user");
//!
//! let db = mongo.database(&builder.database_name());
//! let email = builder.email("owner");
//! # }
//! ```

mod mongo;

pub use mongo::TestMongo;

/// Builder for test data with a fixed seed, so reruns produce the same values
/// and different tests do not collide in a shared database.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seeds the builder from a hash of the test name.
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// e.g. `test-user-12345-main`
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// A lowercase address unique to this test, e.g. `owner-12345@example.com`
    pub fn email(&self, local: &str) -> String {
        format!("{}-{}@example.com", local.to_lowercase(), self.seed)
    }

    /// Database name unique to this test
    pub fn database_name(&self) -> String {
        format!("test_{}", self.seed)
    }
}
