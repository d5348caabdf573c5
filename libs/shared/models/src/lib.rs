pub mod auth;
pub mod dentist;
pub mod error;
