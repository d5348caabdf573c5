pub mod aggregation;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use aggregation::*;
pub use router::*;
