//! Integration tests for the PostgreSQL claim repository
//!
//! These run against a disposable container and are ignored by default.

use rust_decimal_macros::dec;

use core_kernel::ClaimId;
use domain_claims::{ClaimPort, NewClaim, ProcedureCode};
use infra_db::{DatabaseError, PostgresClaimRepository};
use test_utils::db_test;

fn submission(amount: rust_decimal::Decimal) -> NewClaim {
    NewClaim::new("Acme", amount, vec![ProcedureCode::P1, ProcedureCode::P2]).unwrap()
}

db_test!(test_create_assigns_id_and_defaults, |pool| {
    let repo = PostgresClaimRepository::new(pool);

    let claim = repo.create(submission(dec!(120.50))).await.unwrap();

    assert_eq!(claim.id, ClaimId::new(1));
    assert_eq!(claim.status, "submitted");
    assert_eq!(claim.amount.to_string(), "120.50");
    assert_eq!(claim.procedure_codes, vec![ProcedureCode::P1, ProcedureCode::P2]);
    assert_eq!(claim.created_at, claim.updated_at);
});

db_test!(test_find_returns_stored_claim, |pool| {
    let repo = PostgresClaimRepository::new(pool);
    let created = repo.create(submission(dec!(99999999.99))).await.unwrap();

    let fetched = repo.find_by_id(created.id).await.unwrap();

    assert_eq!(fetched, Some(created));
});

db_test!(test_find_unknown_id_is_none, |pool| {
    let repo = PostgresClaimRepository::new(pool);

    assert_eq!(repo.find_by_id(ClaimId::new(999_999)).await.unwrap(), None);
});

db_test!(test_ids_increase, |pool| {
    let repo = PostgresClaimRepository::new(pool);

    let first = repo.create(submission(dec!(1))).await.unwrap();
    let second = repo.create(submission(dec!(0))).await.unwrap();

    assert!(second.id.value() > first.id.value());
    assert_eq!(second.amount.to_string(), "0.00");
});

db_test!(test_schema_rejects_unknown_code, |pool| {
    let result = sqlx::query(
        "INSERT INTO claims (payer, amount, procedure_codes) VALUES ('Acme', 1, ARRAY['X9'])",
    )
    .execute(&pool)
    .await;

    assert!(matches!(
        DatabaseError::from(result.unwrap_err()),
        DatabaseError::ConstraintViolation(_)
    ));
});

db_test!(test_schema_rejects_negative_amount, |pool| {
    let result = sqlx::query(
        "INSERT INTO claims (payer, amount, procedure_codes) VALUES ('Acme', -1, ARRAY['P1'])",
    )
    .execute(&pool)
    .await;

    assert!(matches!(
        DatabaseError::from(result.unwrap_err()),
        DatabaseError::ConstraintViolation(_)
    ));
});
