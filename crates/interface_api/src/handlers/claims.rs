//! Claims handlers
//!
//! Every handler ends in exactly one [`ClaimOutcome`]: one `claims_total`
//! increment and one `claim_processing_duration_seconds` observation. Each
//! store call is timed separately into `db_query_duration_seconds`.

use std::future::Future;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use core_kernel::ClaimId;
use domain_claims::{parse_new_claim, Claim};

use crate::auth::Identity;
use crate::dto::claims::{ClaimResponse, StatusResponse};
use crate::error::ApiError;
use crate::middleware::user_id;
use crate::telemetry::{ClaimOutcome, CLAIMS_TOTAL, CLAIM_PROCESSING_DURATION, DB_QUERY_DURATION};
use crate::AppState;

const CLAIM_TABLE: &str = "claim";

fn record_outcome(state: &AppState, outcome: ClaimOutcome, started: Instant) {
    state
        .metrics
        .increment(CLAIMS_TOTAL, &[("status", outcome.as_str())]);
    state.metrics.observe(
        CLAIM_PROCESSING_DURATION,
        &[("status", outcome.duration_label())],
        started.elapsed().as_secs_f64(),
    );
}

async fn timed_query<T>(
    state: &AppState,
    operation: &'static str,
    query: impl Future<Output = T>,
) -> T {
    let started = Instant::now();
    let result = query.await;
    state.metrics.observe(
        DB_QUERY_DURATION,
        &[("operation", operation), ("table", CLAIM_TABLE)],
        started.elapsed().as_secs_f64(),
    );
    result
}

/// POST /claims
pub async fn create_claim(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let started = Instant::now();
    let user = user_id(identity.as_deref()).to_string();

    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let submission = match parse_new_claim(&payload) {
        Ok(submission) => submission,
        Err(err) => {
            warn!(data = %payload, user_id = %user, error = %err, "Invalid claim data provided");
            record_outcome(&state, ClaimOutcome::Invalid, started);
            return Err(ApiError::invalid_input(err.to_string()));
        }
    };

    info!(
        payer = submission.payer(),
        amount = %submission.amount(),
        procedure_codes = ?submission.procedure_codes(),
        user_id = %user,
        "Creating new claim"
    );

    match timed_query(&state, "create", state.claims.create(submission)).await {
        Ok(claim) => {
            info!(claim_id = %claim.id, user_id = %user, "Claim created successfully");
            record_outcome(&state, ClaimOutcome::Created, started);
            Ok((StatusCode::CREATED, Json(claim.into())))
        }
        Err(err) => {
            error!(error = %err, error_detail = ?err, data = %payload, user_id = %user, "Error creating claim");
            record_outcome(&state, ClaimOutcome::Error, started);
            Err(ApiError::internal(err.to_string()))
        }
    }
}

/// Shared lookup for the two read endpoints
///
/// Identifiers that are not integers cannot name a claim and are reported as
/// not found without a store call.
async fn load_claim(
    state: &AppState,
    raw_id: &str,
    user: &str,
    started: Instant,
    not_found_message: &'static str,
) -> Result<Claim, ApiError> {
    let found = match raw_id.parse::<ClaimId>() {
        Ok(id) => timed_query(state, "find_by_id", state.claims.find_by_id(id)).await,
        Err(_) => Ok(None),
    };

    match found {
        Ok(Some(claim)) => Ok(claim),
        Ok(None) => {
            warn!(claim_id = raw_id, user_id = user, "{}", not_found_message);
            record_outcome(state, ClaimOutcome::NotFound, started);
            Err(ApiError::not_found("Claim not found"))
        }
        Err(err) => {
            error!(error = %err, error_detail = ?err, claim_id = raw_id, user_id = user, "Error retrieving claim");
            record_outcome(state, ClaimOutcome::Error, started);
            Err(ApiError::internal(err.to_string()))
        }
    }
}

/// GET /claims/:id
pub async fn get_claim(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let started = Instant::now();
    let user = user_id(identity.as_deref());
    info!(claim_id = %id, user_id = user, "Fetching claim by ID");

    let claim = load_claim(&state, &id, user, started, "Claim not found").await?;

    debug!(claim_id = %claim.id, user_id = user, "Claim retrieved successfully");
    record_outcome(&state, ClaimOutcome::Success, started);
    Ok(Json(claim.into()))
}

/// GET /claims/status/:id
pub async fn get_claim_status(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let started = Instant::now();
    let user = user_id(identity.as_deref());
    info!(claim_id = %id, user_id = user, "Checking claim status");

    let claim = load_claim(&state, &id, user, started, "Claim not found when checking status").await?;

    debug!(claim_id = %claim.id, status = %claim.status, user_id = user, "Claim status retrieved successfully");
    record_outcome(&state, ClaimOutcome::Success, started);
    Ok(Json(StatusResponse {
        status: claim.status,
    }))
}
