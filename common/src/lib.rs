//! ratematch common types
//!
//! This crate contains shared types used across the ratematch workspace,
//! including exact decimal helpers, currencies with their rounding digits,
//! identifiers and timestamps.

pub mod currency;
pub mod decimal;
pub mod error;
pub mod identifiers;
pub mod time;

pub use currency::*;
pub use decimal::*;
pub use error::*;
pub use identifiers::*;
pub use time::*;
