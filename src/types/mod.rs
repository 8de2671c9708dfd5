//! Types shared across the application's components.

pub mod basic;
pub mod transaction;
pub mod validators;
