//! Conversion utilities for EVM addresses and log topics.

use alloy_primitives::{Address, B256};

/// Parses a hex address, accepting any letter case.
///
/// Checksums are not enforced; addresses from headers and configuration are
/// frequently lowercased.
pub fn parse_address(value: &str) -> Result<Address, String> {
	let trimmed = value.trim();
	trimmed
		.to_lowercase()
		.parse::<Address>()
		.map_err(|e| format!("Invalid address '{}': {}", trimmed, e))
}

/// Extracts the address held in an indexed event topic.
///
/// Indexed `address` arguments are left-padded to 32 bytes, so the address is
/// the low 20 bytes of the word.
pub fn topic_to_address(topic: &B256) -> Address {
	Address::from_word(*topic)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_address_ignores_case() {
		let lower = parse_address("0xc01efaaf7c5c61bebfaeb358e1161b537b8bc0e0").unwrap();
		let mixed = parse_address("0xc01efAaF7C5C61bEbFAeb358E1161b537b8bC0e0").unwrap();
		assert_eq!(lower, mixed);
		assert!(parse_address("0x1234").is_err());
	}

	#[test]
	fn test_topic_to_address() {
		let address = parse_address("0x5fbdb2315678afecb367f032d93f642f64180aa3").unwrap();
		let topic = address.into_word();
		assert_eq!(topic_to_address(&topic), address);
		assert!(topic.0[..12].iter().all(|b| *b == 0));
	}
}
