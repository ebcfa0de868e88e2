//! Safe transactions and the relayer's wire types.

use alloy_primitives::{Address, Bytes, U256};
use clob_core::signing::RawSignature;
use clob_core::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the Safe invokes the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OperationType {
    #[default]
    Call,
    DelegateCall,
}

impl OperationType {
    pub fn as_u8(self) -> u8 {
        match self {
            OperationType::Call => 0,
            OperationType::DelegateCall => 1,
        }
    }
}

impl From<OperationType> for u8 {
    fn from(op: OperationType) -> Self {
        op.as_u8()
    }
}

impl TryFrom<u8> for OperationType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OperationType::Call),
            1 => Ok(OperationType::DelegateCall),
            other => Err(Error::validation(format!("invalid operation type: {}", other))),
        }
    }
}

/// One call executed by a Safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeTransaction {
    pub to: Address,
    pub operation: OperationType,
    pub data: Bytes,
    pub value: U256,
}

impl SafeTransaction {
    /// A plain call with no value attached.
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            operation: OperationType::Call,
            data: data.into(),
            value: U256::ZERO,
        }
    }
}

/// Inputs for executing calls through an existing Safe.
#[derive(Debug, Clone)]
pub struct SafeTransactionArgs {
    /// Owner account that signs for the Safe.
    pub from_address: Address,
    /// Safe nonce, read on chain right before building.
    pub nonce: U256,
    pub chain_id: u64,
    pub transactions: Vec<SafeTransaction>,
}

/// Inputs for deploying a Safe through the factory.
#[derive(Debug, Clone)]
pub struct SafeCreateArgs {
    pub from_address: Address,
    pub chain_id: u64,
    pub payment_token: Address,
    pub payment: U256,
    pub payment_receiver: Address,
}

impl SafeCreateArgs {
    /// A sponsored deployment: no payment token, amount or receiver.
    pub fn sponsored(from_address: Address, chain_id: u64) -> Self {
        Self {
            from_address,
            chain_id,
            payment_token: Address::ZERO,
            payment: U256::ZERO,
            payment_receiver: Address::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "SAFE-CREATE")]
    SafeCreate,
}

/// Signature parameters the relayer needs to replay the signed struct.
///
/// SAFE requests fill the gas fields, SAFE-CREATE requests fill the payment
/// fields. Unset fields are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_txn_gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_receiver: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_receiver: Option<String>,
}

impl SignatureParams {
    /// Zero gas parameters for a relayer-paid SafeTx.
    pub fn safe(operation: OperationType) -> Self {
        let zero = Address::ZERO.to_checksum(None);
        Self {
            gas_price: Some("0".to_string()),
            operation: Some(operation.as_u8().to_string()),
            safe_txn_gas: Some("0".to_string()),
            base_gas: Some("0".to_string()),
            gas_token: Some(zero.clone()),
            refund_receiver: Some(zero),
            ..Default::default()
        }
    }

    pub fn safe_create(payment_token: Address, payment: U256, payment_receiver: Address) -> Self {
        Self {
            payment_token: Some(payment_token.to_checksum(None)),
            payment: Some(payment.to_string()),
            payment_receiver: Some(payment_receiver.to_checksum(None)),
            ..Default::default()
        }
    }
}

/// Envelope posted to the relayer's submit endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub from: String,
    pub to: String,
    pub proxy_wallet: String,
    /// `0x`-prefixed call data.
    pub data: String,
    /// `0x`-prefixed packed signature.
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_params: Option<SignatureParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl TransactionRequest {
    /// Serialize exactly as it is sent and signed.
    pub fn to_body(&self) -> clob_core::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A signature in the layout the Safe contract verifies: `r ++ s ++ v`
/// with `v` shifted to 31/32 for `eth_sign`-style approvals.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PackedSafeSignature(pub(crate) RawSignature);

impl PackedSafeSignature {
    pub fn as_bytes(&self) -> &[u8; 65] {
        self.0.as_bytes()
    }

    pub fn v(&self) -> u8 {
        self.0.v()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Debug for PackedSafeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedSafeSignature({})", self.to_hex())
    }
}

/// Lifecycle states reported by the relayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelayerTransactionState {
    #[serde(rename = "STATE_NEW")]
    New,
    #[serde(rename = "STATE_EXECUTED")]
    Executed,
    #[serde(rename = "STATE_MINED")]
    Mined,
    #[serde(rename = "STATE_INVALID")]
    Invalid,
    #[serde(rename = "STATE_CONFIRMED")]
    Confirmed,
    #[serde(rename = "STATE_FAILED")]
    Failed,
}

impl RelayerTransactionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayerTransactionState::New => "STATE_NEW",
            RelayerTransactionState::Executed => "STATE_EXECUTED",
            RelayerTransactionState::Mined => "STATE_MINED",
            RelayerTransactionState::Invalid => "STATE_INVALID",
            RelayerTransactionState::Confirmed => "STATE_CONFIRMED",
            RelayerTransactionState::Failed => "STATE_FAILED",
        }
    }

    /// No further transitions happen from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RelayerTransactionState::Confirmed
                | RelayerTransactionState::Failed
                | RelayerTransactionState::Invalid
        )
    }
}

impl fmt::Display for RelayerTransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelayerTransactionState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STATE_NEW" => Ok(RelayerTransactionState::New),
            "STATE_EXECUTED" => Ok(RelayerTransactionState::Executed),
            "STATE_MINED" => Ok(RelayerTransactionState::Mined),
            "STATE_INVALID" => Ok(RelayerTransactionState::Invalid),
            "STATE_CONFIRMED" => Ok(RelayerTransactionState::Confirmed),
            "STATE_FAILED" => Ok(RelayerTransactionState::Failed),
            other => Err(Error::validation(format!("unknown relayer state: {}", other))),
        }
    }
}

/// Relayer answer to a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    #[serde(default, rename = "transactionID")]
    pub transaction_id: String,
    #[serde(default, rename = "transactionHash")]
    pub transaction_hash: String,
}

/// A relayed transaction as reported by the relayer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayerTransaction {
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
    #[serde(default, rename = "transactionHash")]
    pub transaction_hash: String,
    /// Raw state string, see [`RelayerTransaction::state`].
    #[serde(rename = "state")]
    pub raw_state: String,
}

impl RelayerTransaction {
    /// Parsed state, `None` for states this client does not know.
    pub fn state(&self) -> Option<RelayerTransactionState> {
        self.raw_state.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_type_serde() {
        assert_eq!(serde_json::to_string(&OperationType::DelegateCall).unwrap(), "1");
        let op: OperationType = serde_json::from_str("0").unwrap();
        assert_eq!(op, OperationType::Call);
        assert!(serde_json::from_str::<OperationType>("2").is_err());
    }

    #[test]
    fn test_safe_request_json_shape() {
        let request = TransactionRequest {
            transaction_type: TransactionType::Safe,
            from: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
            to: "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174".to_string(),
            proxy_wallet: "0x0000000000000000000000000000000000000001".to_string(),
            data: "0x095ea7b3".to_string(),
            signature: "0xabcd".to_string(),
            signature_params: Some(SignatureParams::safe(OperationType::Call)),
            value: Some("0".to_string()),
            nonce: Some("7".to_string()),
            metadata: None,
        };
        let json: serde_json::Value = serde_json::from_str(&request.to_body().unwrap()).unwrap();

        assert_eq!(json["type"], "SAFE");
        assert_eq!(json["proxyWallet"], "0x0000000000000000000000000000000000000001");
        assert_eq!(json["nonce"], "7");
        assert!(json.get("metadata").is_none());

        let params = &json["signatureParams"];
        assert_eq!(params["gasPrice"], "0");
        assert_eq!(params["operation"], "0");
        assert_eq!(params["safeTxnGas"], "0");
        assert_eq!(params["baseGas"], "0");
        assert_eq!(params["gasToken"], "0x0000000000000000000000000000000000000000");
        assert!(params.get("paymentToken").is_none());
    }

    #[test]
    fn test_create_params_omit_gas_fields() {
        let params = SignatureParams::safe_create(Address::ZERO, U256::ZERO, Address::ZERO);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["payment"], "0");
        assert!(json.get("gasPrice").is_none());
        assert_eq!(json.as_object().unwrap().len(), 3);

        let ty = serde_json::to_string(&TransactionType::SafeCreate).unwrap();
        assert_eq!(ty, "\"SAFE-CREATE\"");
    }

    #[test]
    fn test_relayer_state_parsing() {
        let tx: RelayerTransaction = serde_json::from_str(
            r#"{"transactionID":"abc","transactionHash":"0x01","state":"STATE_MINED"}"#,
        )
        .unwrap();
        assert_eq!(tx.state(), Some(RelayerTransactionState::Mined));
        assert!(!RelayerTransactionState::Mined.is_terminal());
        assert!(RelayerTransactionState::Failed.is_terminal());

        let unknown: RelayerTransaction =
            serde_json::from_str(r#"{"transactionID":"abc","state":"STATE_QUEUED"}"#).unwrap();
        assert_eq!(unknown.state(), None);
        assert_eq!(unknown.transaction_hash, "");
    }

    #[test]
    fn test_state_roundtrip_strings() {
        for state in [
            RelayerTransactionState::New,
            RelayerTransactionState::Executed,
            RelayerTransactionState::Mined,
            RelayerTransactionState::Invalid,
            RelayerTransactionState::Confirmed,
            RelayerTransactionState::Failed,
        ] {
            assert_eq!(state.as_str().parse::<RelayerTransactionState>().unwrap(), state);
            assert_eq!(
                serde_json::to_string(&state).unwrap(),
                format!("\"{}\"", state)
            );
        }
    }
}
