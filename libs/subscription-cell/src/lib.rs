pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;

pub use gate::*;
pub use router::*;
