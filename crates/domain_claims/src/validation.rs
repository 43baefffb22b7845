//! Claim submission validation
//!
//! Submissions arrive as untyped JSON so that a missing field, a field of the
//! wrong type and an out-of-range value can all be reported the same way
//! instead of surfacing as a deserializer rejection.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::claim::{NewClaim, ProcedureCode};
use crate::error::ClaimError;

/// Validates a raw submission payload
///
/// # Errors
///
/// Returns a [`ClaimError`] describing the first problem found, checking
/// `payer`, then `amount`, then `procedure_codes`.
pub fn parse_new_claim(payload: &Value) -> Result<NewClaim, ClaimError> {
    let object = payload.as_object().ok_or(ClaimError::NotAnObject)?;

    let payer = match present(object.get("payer")) {
        None => return Err(ClaimError::MissingField("payer")),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ClaimError::invalid("payer", "must be a string")),
    };

    let amount = match present(object.get("amount")) {
        None => return Err(ClaimError::MissingField("amount")),
        Some(value) => parse_amount(value)?,
    };

    let procedure_codes = match present(object.get("procedure_codes")) {
        None => return Err(ClaimError::MissingField("procedure_codes")),
        Some(Value::Array(items)) => items
            .iter()
            .map(parse_code)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ClaimError::invalid("procedure_codes", "must be an array")),
    };

    NewClaim::new(payer, amount, procedure_codes)
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn parse_amount(value: &Value) -> Result<Decimal, ClaimError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(ClaimError::invalid("amount", "must be a number")),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ClaimError::invalid("amount", "must be a number"))
}

fn parse_code(value: &Value) -> Result<ProcedureCode, ClaimError> {
    match value {
        Value::String(s) => s.parse(),
        other => Err(ClaimError::UnknownProcedureCode(other.to_string())),
    }
}
