//! Hosted-backend storage for products.

mod model;
mod repository;

pub use model::{NewProductRow, ProductPatch, ProductRow};
pub use repository::ProductRepository;
