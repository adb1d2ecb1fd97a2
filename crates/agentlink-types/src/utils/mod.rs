//! Utility functions for common type conversions and transformations.
//!
//! This module provides helper functions for address handling and string
//! formatting used throughout the service.

pub mod conversion;
pub mod formatting;

pub use conversion::{parse_address, topic_to_address};
pub use formatting::{format_token_amount, truncate_id, without_0x_prefix};
