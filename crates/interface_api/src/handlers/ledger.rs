//! Ledger report handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use core_kernel::{Amount, UnitId};
use domain_billing::UnitLedger;

use crate::auth::{permissions, require, Claims};
use crate::{error::ApiError, AppState};

#[derive(Serialize)]
pub struct ReceivedResponse {
    pub unit_id: UnitId,
    pub total: Amount,
}

/// Twelve-month ledger of a unit
pub async fn unit_year(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, year)): Path<(Uuid, i32)>,
) -> Result<Json<UnitLedger>, ApiError> {
    require(&claims, permissions::LEDGER_READ)?;
    let ledger = state.reporter.unit_year(UnitId::from_uuid(id), year).await?;
    Ok(Json(ledger))
}

/// Everything ever received for a unit
pub async fn total_received(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReceivedResponse>, ApiError> {
    require(&claims, permissions::LEDGER_READ)?;
    let unit_id = UnitId::from_uuid(id);
    let total = state.reporter.total_received(unit_id).await?;
    Ok(Json(ReceivedResponse { unit_id, total }))
}
