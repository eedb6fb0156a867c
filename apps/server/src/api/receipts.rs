use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::NaiveDate;
use givd_core::receipts::{parse_items_text, NewReceipt, Receipt, ReceiptItem};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};

/// Receipt form: items come either structured or as one name per line.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateReceiptRequest {
    store_name: String,
    total_amount: Decimal,
    purchase_date: NaiveDate,
    #[serde(default)]
    items: Option<Vec<ReceiptItem>>,
    #[serde(default)]
    items_text: Option<String>,
}

impl From<CreateReceiptRequest> for NewReceipt {
    fn from(req: CreateReceiptRequest) -> Self {
        let items = match (req.items, req.items_text) {
            (Some(items), _) => items,
            (None, Some(text)) => parse_items_text(&text),
            (None, None) => Vec::new(),
        };
        NewReceipt {
            store_name: req.store_name,
            total_amount: req.total_amount,
            purchase_date: req.purchase_date,
            items,
        }
    }
}

async fn list_receipts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Receipt>>> {
    let receipts = state.receipt_service.list_receipts().await?;
    Ok(Json(receipts))
}

async fn create_receipt(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReceiptRequest>,
) -> ApiResult<(StatusCode, Json<Receipt>)> {
    let receipt = state.receipt_service.create_receipt(req.into()).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/receipts", get(list_receipts).post(create_receipt))
}
