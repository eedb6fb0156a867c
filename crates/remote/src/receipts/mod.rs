//! Hosted-backend storage for receipts.

mod model;
mod repository;

pub use model::{NewReceiptRow, ReceiptRow};
pub use repository::ReceiptRepository;
