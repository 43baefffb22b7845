//! Claims repository implementation
//!
//! PostgreSQL adapter for the claims domain. Implements `ClaimPort` over the
//! `claims` table created by the embedded migrations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{ClaimId, DomainPort, PortError};
use domain_claims::{Claim, ClaimPort, NewClaim, ProcedureCode};

use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = "id, payer, amount, procedure_codes, status, created_at, updated_at";

/// PostgreSQL-backed implementation of the ClaimPort trait
///
/// # Error Handling
///
/// Database errors are translated to `PortError` variants through
/// [`DatabaseError`]; a missing row is not an error and comes back as `None`.
#[derive(Debug, Clone)]
pub struct PostgresClaimRepository {
    pool: PgPool,
}

impl PostgresClaimRepository {
    /// Creates a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a claim and returns the stored row
    pub async fn insert(&self, claim: &NewClaim) -> Result<ClaimRow, DatabaseError> {
        let codes: Vec<String> = claim
            .procedure_codes()
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();

        let row = sqlx::query_as::<_, ClaimRow>(&format!(
            "INSERT INTO claims (payer, amount, procedure_codes) VALUES ($1, $2, $3) RETURNING {}",
            CLAIM_COLUMNS
        ))
        .bind(claim.payer())
        .bind(claim.amount())
        .bind(codes)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Retrieves a claim row by its identifier
    pub async fn get_by_id(&self, id: i64) -> Result<Option<ClaimRow>, DatabaseError> {
        let row = sqlx::query_as::<_, ClaimRow>(&format!(
            "SELECT {} FROM claims WHERE id = $1",
            CLAIM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

impl DomainPort for PostgresClaimRepository {}

#[async_trait]
impl ClaimPort for PostgresClaimRepository {
    #[instrument(skip(self, claim), fields(payer = %claim.payer()))]
    async fn create(&self, claim: NewClaim) -> Result<Claim, PortError> {
        let row = self.insert(&claim).await?;
        debug!(claim_id = row.id, "Inserted claim row");
        Ok(Claim::try_from(row)?)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ClaimId) -> Result<Option<Claim>, PortError> {
        match self.get_by_id(id.value()).await? {
            Some(row) => Ok(Some(Claim::try_from(row)?)),
            None => Ok(None),
        }
    }
}

/// Database row for claim
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub id: i64,
    pub payer: String,
    pub amount: Decimal,
    pub procedure_codes: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let procedure_codes = row
            .procedure_codes
            .iter()
            .map(|code| code.parse::<ProcedureCode>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::SerializationError(format!("claim {}: {}", row.id, e)))?;

        Ok(Claim {
            id: ClaimId::new(row.id),
            payer: row.payer,
            amount: row.amount,
            procedure_codes,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(codes: &[&str]) -> ClaimRow {
        let now = Utc::now();
        ClaimRow {
            id: 5,
            payer: "Acme".to_string(),
            amount: Decimal::new(12050, 2),
            procedure_codes: codes.iter().map(|c| c.to_string()).collect(),
            status: "submitted".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_maps_to_claim() {
        let claim = Claim::try_from(row(&["P1", "P3"])).unwrap();

        assert_eq!(claim.id, ClaimId::new(5));
        assert_eq!(claim.procedure_codes, vec![ProcedureCode::P1, ProcedureCode::P3]);
        assert_eq!(claim.amount.to_string(), "120.50");
    }

    #[test]
    fn test_row_with_unknown_code_fails() {
        let err = Claim::try_from(row(&["P1", "Z0"])).unwrap_err();
        assert!(matches!(err, DatabaseError::SerializationError(_)));
    }
}
