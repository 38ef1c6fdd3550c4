//! Common utilities for the pinroute toolkit

pub mod error;

pub use error::{suggest_location, Error, Result};
