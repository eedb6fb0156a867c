//! Receipts module - purchase receipts, spend aggregation, and traits.

mod receipts_model;
mod receipts_service;
mod receipts_traits;

pub use receipts_model::{parse_items_text, start_of_month, NewReceipt, Receipt, ReceiptItem};
pub use receipts_service::ReceiptService;
pub use receipts_traits::{ReceiptRepositoryTrait, ReceiptServiceTrait};
