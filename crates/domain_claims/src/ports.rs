//! Claims Domain Ports
//!
//! The `ClaimPort` trait is everything the claim handlers need from the
//! store: insert a validated submission, and fetch a claim by key.
//!
//! - **Internal Adapter**: PostgreSQL (`infra_db::PostgresClaimRepository`)
//! - **Mock Adapter**: In-memory, for tests without a database
//!
//! ```rust,ignore
//! use domain_claims::ClaimPort;
//! use std::sync::Arc;
//!
//! let port: Arc<dyn ClaimPort> = Arc::new(PostgresClaimRepository::new(pool));
//! let claim = port.create(new_claim).await?;
//! ```

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, PortError};

use crate::claim::{Claim, NewClaim};

/// Persistence port for claims
#[async_trait]
pub trait ClaimPort: DomainPort {
    /// Persists a new claim and returns the stored record, including the
    /// generated identifier, status and timestamps
    async fn create(&self, claim: NewClaim) -> Result<Claim, PortError>;

    /// Fetches a claim by identifier, `Ok(None)` when no such claim exists
    async fn find_by_id(&self, id: ClaimId) -> Result<Option<Claim>, PortError>;
}

/// Mock implementation of ClaimPort for testing
///
/// Stores claims in memory and hands out sequential identifiers starting at 1.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicI64, Ordering};
    use chrono::Utc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of ClaimPort
    #[derive(Debug)]
    pub struct MockClaimPort {
        claims: RwLock<BTreeMap<ClaimId, Claim>>,
        next_id: AtomicI64,
        failure: Option<String>,
    }

    impl Default for MockClaimPort {
        fn default() -> Self {
            Self {
                claims: RwLock::new(BTreeMap::new()),
                next_id: AtomicI64::new(1),
                failure: None,
            }
        }
    }

    impl MockClaimPort {
        /// Creates an empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a port whose every call fails with a connection error
        pub fn failing(message: impl Into<String>) -> Self {
            Self {
                failure: Some(message.into()),
                ..Self::default()
            }
        }

        /// Pre-populates with claims for testing
        pub async fn with_claims(claims: Vec<Claim>) -> Self {
            let port = Self::new();
            {
                let mut stored = port.claims.write().await;
                for claim in claims {
                    let next = claim.id.value() + 1;
                    port.next_id.fetch_max(next, Ordering::SeqCst);
                    stored.insert(claim.id, claim);
                }
            }
            port
        }

        /// Number of stored claims
        pub async fn len(&self) -> usize {
            self.claims.read().await.len()
        }

        /// Returns true when nothing has been stored
        pub async fn is_empty(&self) -> bool {
            self.claims.read().await.is_empty()
        }

        fn check_failure(&self) -> Result<(), PortError> {
            match &self.failure {
                Some(message) => Err(PortError::connection(message.clone())),
                None => Ok(()),
            }
        }
    }

    impl DomainPort for MockClaimPort {}

    #[async_trait]
    impl ClaimPort for MockClaimPort {
        async fn create(&self, claim: NewClaim) -> Result<Claim, PortError> {
            self.check_failure()?;
            let id = ClaimId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
            let claim = claim.into_claim(id, Utc::now());
            self.claims.write().await.insert(id, claim.clone());
            Ok(claim)
        }

        async fn find_by_id(&self, id: ClaimId) -> Result<Option<Claim>, PortError> {
            self.check_failure()?;
            Ok(self.claims.read().await.get(&id).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::MockClaimPort;
    use crate::claim::ProcedureCode;
    use rust_decimal_macros::dec;

    fn submission() -> NewClaim {
        NewClaim::new("Acme", dec!(120.50), vec![ProcedureCode::P1]).unwrap()
    }

    #[tokio::test]
    async fn test_mock_port_create_and_get() {
        let port = MockClaimPort::new();

        let created = port.create(submission()).await.unwrap();
        assert_eq!(created.id, ClaimId::new(1));
        assert_eq!(created.status, "submitted");

        let fetched = port.find_by_id(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_mock_port_missing_claim() {
        let port = MockClaimPort::new();
        assert_eq!(port.find_by_id(ClaimId::new(999_999)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mock_port_ids_are_sequential() {
        let port = MockClaimPort::new();
        let first = port.create(submission()).await.unwrap();
        let second = port.create(submission()).await.unwrap();

        assert_eq!(second.id.value(), first.id.value() + 1);
        assert_eq!(port.len().await, 2);
    }

    #[tokio::test]
    async fn test_mock_port_seeded_ids_continue() {
        let existing = submission().into_claim(ClaimId::new(10), chrono::Utc::now());
        let port = MockClaimPort::with_claims(vec![existing]).await;

        let created = port.create(submission()).await.unwrap();
        assert_eq!(created.id, ClaimId::new(11));
    }

    #[tokio::test]
    async fn test_failing_port() {
        let port = MockClaimPort::failing("connection refused");

        let err = port.create(submission()).await.unwrap_err();
        assert!(err.is_connection_error());
        assert!(port.is_empty().await);
    }
}
