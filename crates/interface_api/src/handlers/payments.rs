//! Payment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Amount, BillingMonth, PaymentId, TenantId, UnitId};
use domain_billing::{AllocationRequest, ReversalOutcome, TransactionEntry};

use crate::auth::{permissions, require, Claims};
use crate::dto::payments::*;
use crate::{error::ApiError, AppState};

/// Allocates a payment across the unit's billing periods
pub async fn allocate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<AllocatePaymentRequest>,
) -> Result<(StatusCode, Json<AllocationResponse>), ApiError> {
    require(&claims, permissions::PAYMENT_WRITE)?;
    body.validate()?;

    let start = start_month(&state, body.start_year, body.start_month)?;
    let mut request = AllocationRequest::new(
        UnitId::from_uuid(body.unit_id),
        TenantId::from_uuid(body.tenant_id),
        Amount::new(body.amount),
        start,
    )
    .with_method(body.method);
    if let Some(tx_ref) = body.tx_ref {
        request = request.with_reference(tx_ref);
    }
    if let Some(msisdn) = body.msisdn {
        request = request.with_msisdn(msisdn);
    }

    let allocations = state.allocator.allocate(request).await?;
    Ok((StatusCode::CREATED, Json(AllocationResponse { allocations })))
}

/// Recent payments across all units, newest first
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Vec<TransactionEntry>>, ApiError> {
    require(&claims, permissions::LEDGER_READ)?;
    query.validate()?;
    Ok(Json(state.reporter.transactions(query.limit()).await?))
}

/// Reverses a confirmed payment and resettles its period
pub async fn reverse(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReversePaymentRequest>,
) -> Result<Json<ReversalOutcome>, ApiError> {
    require(&claims, permissions::PAYMENT_REVERSE)?;
    body.validate()?;

    let outcome = state.allocator.reverse(PaymentId::from_uuid(id), &body.reason).await?;
    Ok(Json(outcome))
}

fn start_month(state: &AppState, year: Option<i32>, month: Option<u32>) -> Result<BillingMonth, ApiError> {
    match (year, month) {
        (Some(year), Some(month)) => BillingMonth::new(year, month).map_err(|e| ApiError::BadRequest(e.to_string())),
        (None, None) => state
            .config
            .timezone
            .billing_month(Utc::now())
            .map_err(|e| ApiError::Internal(e.to_string())),
        _ => Err(ApiError::BadRequest(
            "start_year and start_month must be given together".to_string(),
        )),
    }
}
