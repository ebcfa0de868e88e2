//! Batching several Safe calls into one `multiSend(bytes)` delegate call.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use clob_core::encoding::{encode_packed, Token};
use clob_core::{Error, Result};

use crate::model::{OperationType, SafeTransaction};

sol! {
    function multiSend(bytes transactions);
}

/// Per-call header: operation (1) ++ to (20) ++ value (32) ++ data length (32).
const ENTRY_HEADER_LEN: usize = 1 + 20 + 32 + 32;

fn pack_entry(tx: &SafeTransaction) -> Vec<u8> {
    encode_packed(&[
        Token::Uint8(tx.operation.as_u8()),
        Token::Address(tx.to),
        Token::Uint(tx.value),
        Token::Uint(U256::from(tx.data.len())),
        Token::Bytes(tx.data.to_vec()),
    ])
}

/// Collapse calls into the single transaction a Safe executes.
///
/// One call is returned unchanged. Two or more become a delegate call to
/// `multisend` carrying the packed batch. An empty batch is an error.
pub fn aggregate_transactions(
    transactions: &[SafeTransaction],
    multisend: Address,
) -> Result<SafeTransaction> {
    match transactions {
        [] => Err(Error::validation("no transactions to execute")),
        [single] => Ok(single.clone()),
        many => {
            let packed: Vec<u8> = many.iter().flat_map(pack_entry).collect();
            let data = multiSendCall {
                transactions: packed.into(),
            }
            .abi_encode();
            Ok(SafeTransaction {
                to: multisend,
                operation: OperationType::DelegateCall,
                data: data.into(),
                value: U256::ZERO,
            })
        }
    }
}

/// Split `multiSend(bytes)` call data back into its calls.
pub fn decode_multisend(data: &[u8]) -> Result<Vec<SafeTransaction>> {
    let call = multiSendCall::abi_decode(data)
        .map_err(|e| Error::encoding(format!("not a multiSend call: {}", e)))?;
    let packed = call.transactions.as_ref();

    let mut transactions = Vec::new();
    let mut offset = 0;
    while offset < packed.len() {
        let header = packed
            .get(offset..offset + ENTRY_HEADER_LEN)
            .ok_or_else(|| Error::encoding(format!("truncated multisend entry at byte {}", offset)))?;

        let operation = OperationType::try_from(header[0])?;
        let to = Address::from_slice(&header[1..21]);
        let value = U256::from_be_slice(&header[21..53]);
        let len = U256::from_be_slice(&header[53..85]);
        let len = usize::try_from(len)
            .map_err(|_| Error::encoding(format!("multisend data length too large: {}", len)))?;

        let start = offset + ENTRY_HEADER_LEN;
        let end = start.saturating_add(len);
        let data = packed
            .get(start..end)
            .ok_or_else(|| Error::encoding(format!("truncated multisend data at byte {}", start)))?;

        transactions.push(SafeTransaction {
            to,
            operation,
            data: Bytes::copy_from_slice(data),
            value,
        });
        offset = end;
    }
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clob_core::encoding::function_selector;

    fn multisend() -> Address {
        "0xA238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761".parse().unwrap()
    }

    fn usdc() -> Address {
        "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174".parse().unwrap()
    }

    fn ctf() -> Address {
        "0x4D97DCd97eC945f40cF65F87097ACe5EA0476045".parse().unwrap()
    }

    #[test]
    fn test_single_transaction_is_unchanged() {
        let tx = SafeTransaction::call(usdc(), vec![1, 2, 3]);
        let aggregated = aggregate_transactions(std::slice::from_ref(&tx), multisend()).unwrap();
        assert_eq!(aggregated, tx);
    }

    #[test]
    fn test_empty_batch_is_error() {
        let err = aggregate_transactions(&[], multisend()).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_batch_becomes_delegate_call() {
        let txs = vec![
            SafeTransaction::call(usdc(), vec![0xaa; 68]),
            SafeTransaction::call(ctf(), vec![0xbb; 4]),
        ];
        let aggregated = aggregate_transactions(&txs, multisend()).unwrap();

        assert_eq!(aggregated.to, multisend());
        assert_eq!(aggregated.operation, OperationType::DelegateCall);
        assert_eq!(aggregated.value, U256::ZERO);
        assert_eq!(&aggregated.data[..4], &function_selector("multiSend(bytes)"));
    }

    #[test]
    fn test_packed_entry_layout() {
        let txs = vec![
            SafeTransaction::call(usdc(), vec![0xaa, 0xbb]),
            SafeTransaction {
                to: ctf(),
                operation: OperationType::DelegateCall,
                data: Bytes::new(),
                value: U256::from(5u64),
            },
        ];
        let aggregated = aggregate_transactions(&txs, multisend()).unwrap();
        let data = &aggregated.data;

        // selector ++ offset word ++ length word ++ packed bytes
        let packed_len = U256::from_be_slice(&data[36..68]).to::<usize>();
        assert_eq!(packed_len, (ENTRY_HEADER_LEN + 2) + ENTRY_HEADER_LEN);
        let packed = &data[68..68 + packed_len];

        assert_eq!(packed[0], 0);
        assert_eq!(&packed[1..21], usdc().as_slice());
        assert_eq!(U256::from_be_slice(&packed[53..85]), U256::from(2u64));
        assert_eq!(&packed[85..87], &[0xaa, 0xbb]);

        let second = &packed[87..];
        assert_eq!(second[0], 1);
        assert_eq!(&second[1..21], ctf().as_slice());
        assert_eq!(U256::from_be_slice(&second[21..53]), U256::from(5u64));

        // ABI padding to a word boundary
        assert_eq!(data.len() % 32, 4);
    }

    #[test]
    fn test_decode_recovers_calls() {
        let txs = vec![
            SafeTransaction::call(usdc(), vec![0x09, 0x5e, 0xa7, 0xb3, 0x01]),
            SafeTransaction::call(ctf(), vec![0xa2, 0x2c, 0xb4, 0x65]),
            SafeTransaction::call(ctf(), Vec::new()),
        ];
        let aggregated = aggregate_transactions(&txs, multisend()).unwrap();
        assert_eq!(decode_multisend(&aggregated.data).unwrap(), txs);
    }

    #[test]
    fn test_decode_rejects_truncated_batch() {
        let mut entry = pack_entry(&SafeTransaction::call(usdc(), vec![1, 2, 3, 4]));
        entry.truncate(entry.len() - 1);
        let data = multiSendCall {
            transactions: entry.into(),
        }
        .abi_encode();
        let err = decode_multisend(&data).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_decode_rejects_other_calls() {
        assert!(decode_multisend(&[0x09, 0x5e, 0xa7, 0xb3]).is_err());
    }
}
