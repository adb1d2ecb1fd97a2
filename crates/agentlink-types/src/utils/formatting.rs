//! String formatting utilities.
//!
//! Provides functions for formatting strings for display, including
//! hex string prefix management, token amount formatting, and truncation for readability.

/// Utility function to truncate a hex string for display purposes.
///
/// Shows at most the first 10 characters (`0x` plus 8 hex digits), always
/// followed by "...".
pub fn truncate_id(id: &str) -> String {
	let end = id.char_indices().nth(10).map_or(id.len(), |(idx, _)| idx);
	format!("{}...", &id[..end])
}

/// Removes "0x" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Formats a token amount with decimal places for display.
///
/// Converts a raw token amount (as stored on-chain) to a human-readable
/// format with proper decimal placement.
///
/// # Arguments
///
/// * `amount` - The raw token amount as a string
/// * `decimals` - The number of decimal places for the token
///
/// # Returns
///
/// A formatted string like "1.5" or "0.01"
pub fn format_token_amount(amount: &str, decimals: u8) -> String {
	if decimals == 0 {
		return amount.to_string();
	}

	let decimal_places = decimals as usize;

	// Handle amounts smaller than 1 token
	let (integer_part, decimal_part) = if amount.len() <= decimal_places {
		let decimal_str = format!("{:0>width$}", amount, width = decimal_places);
		("0".to_string(), decimal_str)
	} else {
		let split_pos = amount.len() - decimal_places;
		(
			amount[..split_pos].to_string(),
			amount[split_pos..].to_string(),
		)
	};

	let decimal_trimmed = decimal_part.trim_end_matches('0');

	if decimal_trimmed.is_empty() {
		integer_part
	} else {
		format!("{}.{}", integer_part, decimal_trimmed)
	}
}
