//! Hosted-backend storage and realtime delivery for consumption events.

mod model;
mod realtime;
mod repository;

pub use model::{ConsumptionRow, NewConsumptionRow};
pub use realtime::{decode_insert, RealtimeMessage, SseDecoder};
pub use repository::ConsumptionStore;
