//! ERC-20 transfer matching over receipt logs.
//!
//! A payment is proven by a `Transfer` event emitted by the payment token
//! contract, moving at least the invoiced amount to the seller. The matcher
//! is pure: it inspects an already-fetched receipt and never touches the
//! network.

use agentlink_types::{topic_to_address, EventLog, TransactionReceipt};
use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolEvent};

sol! {
	/// Standard ERC-20 transfer event.
	event Transfer(address indexed from, address indexed to, uint256 value);
}

/// Parties a qualifying transfer must involve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCriteria {
	/// Required recipient.
	pub to: Address,
	/// Required sender, when the payer is known.
	pub from: Option<Address>,
}

impl TransferCriteria {
	/// Recipient-only criteria for facilitator-settled payments.
	pub fn facilitator(to: Address) -> Self {
		Self { to, from: None }
	}

	/// Criteria binding both payer and recipient.
	pub fn direct(from: Address, to: Address) -> Self {
		Self {
			to,
			from: Some(from),
		}
	}
}

/// Decoded view of a `Transfer` log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedTransfer {
	pub from: Address,
	pub to: Address,
	pub value: U256,
}

/// Decodes a log as a `Transfer` emitted by `token`.
///
/// Returns `None` for logs from other contracts, other events, logs without
/// exactly three topics and data payloads that cannot hold a uint256.
pub fn decode_transfer(log: &EventLog, token: Address) -> Option<DecodedTransfer> {
	if log.address != token {
		return None;
	}
	if log.topics.len() != 3 || log.topics[0] != Transfer::SIGNATURE_HASH {
		return None;
	}
	if log.data.len() > 32 {
		return None;
	}
	let value = U256::try_from_be_slice(&log.data)?;

	Some(DecodedTransfer {
		from: topic_to_address(&log.topics[1]),
		to: topic_to_address(&log.topics[2]),
		value,
	})
}

/// Returns the first `token` transfer in `receipt` between the criteria's
/// parties, provided it pays at least `min_amount`.
///
/// Only the first transfer to the recipient (and from the sender, if set) is
/// considered. If it underpays the claim is denied even when a later log
/// would cover the amount.
pub fn find_qualifying_transfer<'a>(
	receipt: &'a TransactionReceipt,
	token: Address,
	min_amount: U256,
	criteria: &TransferCriteria,
) -> Option<&'a EventLog> {
	let (log, transfer) = receipt.logs.iter().find_map(|log| {
		let transfer = decode_transfer(log, token)?;
		let parties_match =
			transfer.to == criteria.to && criteria.from.is_none_or(|from| transfer.from == from);
		parties_match.then_some((log, transfer))
	})?;

	(transfer.value >= min_amount).then_some(log)
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use agentlink_types::TransactionHash;
	use alloy_primitives::{address, Bytes, B256};

	pub(crate) const TOKEN: Address = address!("c01efaaf7c5c61bebfaeb358e1161b537b8bc0e0");
	pub(crate) const SELLER: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
	pub(crate) const PAYER: Address = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");

	pub(crate) fn transfer_log(token: Address, from: Address, to: Address, value: u64) -> EventLog {
		EventLog {
			address: token,
			topics: vec![
				Transfer::SIGNATURE_HASH,
				from.into_word(),
				to.into_word(),
			],
			data: Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec()),
		}
	}

	pub(crate) fn receipt_with(logs: Vec<EventLog>, success: bool) -> TransactionReceipt {
		TransactionReceipt {
			hash: TransactionHash(vec![0xab; 32]),
			block_number: 100,
			success,
			logs,
		}
	}

	#[test]
	fn test_signature_hash_matches_erc20_transfer() {
		assert_eq!(
			format!("{:x}", Transfer::SIGNATURE_HASH),
			"ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
		);
	}

	#[test]
	fn test_facilitator_accepts_exact_threshold() {
		let receipt = receipt_with(vec![transfer_log(TOKEN, PAYER, SELLER, 10_000)], true);
		let found = find_qualifying_transfer(
			&receipt,
			TOKEN,
			U256::from(10_000u64),
			&TransferCriteria::facilitator(SELLER),
		);
		assert!(found.is_some());
	}

	#[test]
	fn test_amount_below_threshold_fails() {
		let receipt = receipt_with(vec![transfer_log(TOKEN, PAYER, SELLER, 9_999)], true);
		let criteria = TransferCriteria::facilitator(SELLER);
		assert!(find_qualifying_transfer(&receipt, TOKEN, U256::from(10_000u64), &criteria).is_none());
		// Anything at or above the threshold passes
		assert!(find_qualifying_transfer(&receipt, TOKEN, U256::from(9_999u64), &criteria).is_some());
		assert!(find_qualifying_transfer(&receipt, TOKEN, U256::from(1u64), &criteria).is_some());
	}

	#[test]
	fn test_other_contract_is_ignored() {
		let other = address!("1111111111111111111111111111111111111111");
		let receipt = receipt_with(vec![transfer_log(other, PAYER, SELLER, 1_000_000)], true);
		assert!(find_qualifying_transfer(
			&receipt,
			TOKEN,
			U256::from(10_000u64),
			&TransferCriteria::facilitator(SELLER)
		)
		.is_none());
	}

	#[test]
	fn test_direct_mode_binds_both_parties() {
		let receipt = receipt_with(vec![transfer_log(TOKEN, PAYER, SELLER, 10_000)], true);
		let min = U256::from(10_000u64);
		let stranger = address!("2222222222222222222222222222222222222222");

		assert!(
			find_qualifying_transfer(&receipt, TOKEN, min, &TransferCriteria::direct(PAYER, SELLER))
				.is_some()
		);
		assert!(find_qualifying_transfer(
			&receipt,
			TOKEN,
			min,
			&TransferCriteria::direct(stranger, SELLER)
		)
		.is_none());
		assert!(find_qualifying_transfer(
			&receipt,
			TOKEN,
			min,
			&TransferCriteria::direct(PAYER, stranger)
		)
		.is_none());
	}

	#[test]
	fn test_wrong_topic_shape_is_skipped() {
		let mut log = transfer_log(TOKEN, PAYER, SELLER, 10_000);
		log.topics.pop();
		let mut foreign_event = transfer_log(TOKEN, PAYER, SELLER, 10_000);
		foreign_event.topics[0] = B256::repeat_byte(0x01);

		let receipt = receipt_with(vec![log, foreign_event], true);
		assert!(find_qualifying_transfer(
			&receipt,
			TOKEN,
			U256::from(1u64),
			&TransferCriteria::facilitator(SELLER)
		)
		.is_none());
	}

	#[test]
	fn test_oversized_data_is_skipped() {
		let mut log = transfer_log(TOKEN, PAYER, SELLER, 10_000);
		log.data = Bytes::from(vec![0u8; 33]);
		assert!(decode_transfer(&log, TOKEN).is_none());
	}

	#[test]
	fn test_first_party_match_decides() {
		let first = transfer_log(TOKEN, PAYER, SELLER, 20_000);
		let second = transfer_log(TOKEN, PAYER, SELLER, 30_000);
		let receipt = receipt_with(vec![first.clone(), second], true);
		let criteria = TransferCriteria::facilitator(SELLER);

		let found = find_qualifying_transfer(&receipt, TOKEN, U256::from(10_000u64), &criteria);
		assert_eq!(found, Some(&first));
	}

	#[test]
	fn test_underpaying_first_transfer_denies_despite_later_logs() {
		let small = transfer_log(TOKEN, PAYER, SELLER, 1);
		let large = transfer_log(TOKEN, PAYER, SELLER, 20_000);
		let receipt = receipt_with(vec![small, large], true);

		assert!(find_qualifying_transfer(
			&receipt,
			TOKEN,
			U256::from(10_000u64),
			&TransferCriteria::facilitator(SELLER)
		)
		.is_none());
	}

	#[test]
	fn test_transfers_to_other_parties_are_passed_over() {
		let stranger = address!("2222222222222222222222222222222222222222");
		let elsewhere = transfer_log(TOKEN, PAYER, stranger, 1);
		let paid = transfer_log(TOKEN, PAYER, SELLER, 10_000);
		let receipt = receipt_with(vec![elsewhere, paid.clone()], true);

		let found = find_qualifying_transfer(
			&receipt,
			TOKEN,
			U256::from(10_000u64),
			&TransferCriteria::facilitator(SELLER),
		);
		assert_eq!(found, Some(&paid));
	}

	#[test]
	fn test_amounts_beyond_u64_compare_correctly() {
		let mut log = transfer_log(TOKEN, PAYER, SELLER, 0);
		log.data = Bytes::from(U256::MAX.to_be_bytes::<32>().to_vec());
		let decoded = decode_transfer(&log, TOKEN).unwrap();
		assert_eq!(decoded.value, U256::MAX);
		assert_eq!(decoded.from, PAYER);
		assert_eq!(decoded.to, SELLER);
	}
}
