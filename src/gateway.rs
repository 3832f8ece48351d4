//! Chain gateway: reads the shared tip ledger object and builds tip transactions.

use crate::config::{Config, TIP_FUNCTION, TIP_MODULE};
use crate::error::TipJarError;
use crate::transaction::{Argument, TipTransaction};
use crate::types::{Tip, TipLedgerSnapshot, HISTORY_LIMIT};
use crate::utils;
use anyhow::Result;
use async_trait::async_trait;
use ethers::providers::{Http, JsonRpcClient, Provider};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Read side of the gateway. Implemented over JSON-RPC and by test doubles.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<TipLedgerSnapshot, TipJarError>;
    async fn fetch_tip_history(&self) -> Result<Vec<Tip>, TipJarError>;
}

/// Package and ledger ids a tip transaction is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipTarget {
    pub package_id: String,
    pub ledger_object_id: String,
}

impl TipTarget {
    pub fn from_config(config: &Config) -> Self {
        Self {
            package_id: config.package_id.clone(),
            ledger_object_id: config.ledger_object_id.clone(),
        }
    }

    /// Build the unsigned tip transaction.
    ///
    /// `amount` is a decimal SUI string the caller has already validated.
    /// Precision below one MIST is truncated. An unparsable amount splits zero.
    pub fn build_tip_transaction(&self, amount: &str, message: &str) -> TipTransaction {
        let mist = utils::sui_str_to_mist(amount).unwrap_or(0);

        let mut builder = TipTransaction::builder();
        let amount_arg = builder.pure_u64(mist);
        let ledger = builder.object(self.ledger_object_id.clone());
        let payment = builder.split_coins(Argument::GasCoin, vec![amount_arg]);
        let message_arg = builder.pure_string(message);
        builder.move_call(
            self.package_id.clone(),
            TIP_MODULE,
            TIP_FUNCTION,
            vec![ledger, payment, message_arg],
        );
        builder.finish()
    }
}

/// JSON-RPC backed gateway for one ledger object.
pub struct ChainGateway<P = Http> {
    provider: Arc<Provider<P>>,
    target: TipTarget,
}

impl ChainGateway<Http> {
    pub fn connect(config: &Config) -> Result<Self> {
        let provider = config.get_provider()?;
        tracing::info!(
            "Using {} RPC endpoint {} for ledger {}",
            config.network_label(),
            config.rpc_url(),
            config.ledger_object_id
        );
        Ok(Self::new(provider, TipTarget::from_config(config)))
    }
}

impl<P: JsonRpcClient> ChainGateway<P> {
    pub fn new(provider: Arc<Provider<P>>, target: TipTarget) -> Self {
        Self { provider, target }
    }

    pub fn target(&self) -> &TipTarget {
        &self.target
    }

    async fn get_ledger_object(&self) -> Result<Value, TipJarError> {
        let options = json!({ "showContent": true, "showType": true });
        self.provider
            .request::<_, Value>("sui_getObject", (self.target.ledger_object_id.as_str(), options))
            .await
            .map_err(|e| TipJarError::Rpc(e.to_string()))
    }
}

#[async_trait]
impl<P: JsonRpcClient + 'static> LedgerReader for ChainGateway<P> {
    async fn fetch_snapshot(&self) -> Result<TipLedgerSnapshot, TipJarError> {
        let response = self.get_ledger_object().await?;
        parse_snapshot(&response)
    }

    async fn fetch_tip_history(&self) -> Result<Vec<Tip>, TipJarError> {
        let response = self.get_ledger_object().await?;
        parse_tip_history(&response)
    }
}

/// `data.content.fields` of a `sui_getObject` result.
fn content_fields(response: &Value) -> Result<&Map<String, Value>, TipJarError> {
    let fields = response
        .get("data")
        .and_then(|data| data.get("content"))
        .and_then(|content| content.get("fields"))
        .and_then(Value::as_object);

    match fields {
        Some(fields) => Ok(fields),
        None => {
            if let Some(err) = response.get("error") {
                tracing::warn!("Ledger object lookup returned error: {}", err);
            }
            Err(TipJarError::InvalidObjectData)
        }
    }
}

/// Sui encodes u64 as a JSON string; smaller integers may arrive as numbers.
fn coerce_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn parse_snapshot(response: &Value) -> Result<TipLedgerSnapshot, TipJarError> {
    let fields = content_fields(response)?;
    let required_u64 = |name: &str| {
        fields.get(name).and_then(coerce_u64).ok_or_else(|| {
            tracing::warn!("Ledger field '{}' missing or not an integer", name);
            TipJarError::InvalidObjectData
        })
    };

    let total_tips_received = required_u64("total_tips_received")?;
    let total_tippers = required_u64("total_tippers")?;
    let creator = fields
        .get("creator")
        .and_then(Value::as_str)
        .ok_or(TipJarError::InvalidObjectData)?
        .to_string();
    let tip_count = fields
        .get("tips")
        .and_then(Value::as_array)
        .ok_or(TipJarError::InvalidObjectData)?
        .len() as u64;

    Ok(TipLedgerSnapshot {
        total_tips_received,
        total_tippers,
        tip_count,
        creator,
    })
}

pub fn parse_tip_history(response: &Value) -> Result<Vec<Tip>, TipJarError> {
    let fields = content_fields(response)?;
    let mut tips: Vec<Tip> = fields
        .get("tips")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(decode_tip_entry).collect())
        .unwrap_or_default();

    tips.sort_unstable_by(|a, b| b.timestamp.cmp(&a.timestamp));
    tips.truncate(HISTORY_LIMIT);
    Ok(tips)
}

/// The two serialization depths a tip entry may come back in.
#[derive(Deserialize)]
#[serde(untagged)]
enum TipEntry {
    Wrapped { fields: RawTip },
    Flat(RawTip),
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawTip {
    sender: Option<String>,
    #[serde(deserialize_with = "loose_u64")]
    amount: u64,
    message: Option<RawMessage>,
    #[serde(deserialize_with = "loose_u64")]
    timestamp: u64,
}

/// `vector<u8>` comes back as a number array; some readers pre-decode it.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMessage {
    Bytes(Vec<i64>),
    Text(String),
}

impl RawMessage {
    fn into_text(self) -> String {
        match self {
            RawMessage::Bytes(bytes) => {
                let masked: Vec<u8> = bytes.into_iter().map(|b| (b & 0xff) as u8).collect();
                String::from_utf8_lossy(&masked).into_owned()
            }
            RawMessage::Text(text) => text,
        }
    }
}

fn loose_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_u64(&value).unwrap_or(0))
}

impl From<RawTip> for Tip {
    fn from(raw: RawTip) -> Self {
        Tip {
            sender: raw.sender.unwrap_or_default(),
            amount: raw.amount,
            message: raw.message.map(RawMessage::into_text).unwrap_or_default(),
            timestamp: raw.timestamp,
        }
    }
}

fn decode_tip_entry(entry: &Value) -> Tip {
    let raw = match TipEntry::deserialize(entry) {
        Ok(TipEntry::Wrapped { fields }) => fields,
        Ok(TipEntry::Flat(raw)) => raw,
        Err(e) => {
            tracing::debug!("Unrecognized tip entry shape ({}), using defaults", e);
            RawTip::default()
        }
    };
    Tip::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{CallArg, Command, PureValue};
    use ethers::providers::MockProvider;

    const LEDGER: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";
    const PACKAGE: &str = "0x00000000000000000000000000000000000000000000000000000000000000bb";

    fn response_with(fields: Value) -> Value {
        json!({
            "data": {
                "objectId": LEDGER,
                "version": "12",
                "type": format!("{}::sui_buy_me_coffee::BuyMeCoffee", PACKAGE),
                "content": {
                    "dataType": "moveObject",
                    "type": format!("{}::sui_buy_me_coffee::BuyMeCoffee", PACKAGE),
                    "hasPublicTransfer": false,
                    "fields": fields
                }
            }
        })
    }

    fn wrapped_tip(sender: &str, amount: &str, message: &str, timestamp: &str) -> Value {
        json!({
            "type": format!("{}::sui_buy_me_coffee::Tip", PACKAGE),
            "fields": {
                "sender": sender,
                "amount": amount,
                "message": message.as_bytes(),
                "timestamp": timestamp
            }
        })
    }

    fn target() -> TipTarget {
        TipTarget {
            package_id: PACKAGE.to_string(),
            ledger_object_id: LEDGER.to_string(),
        }
    }

    // ==================== parse_snapshot tests ====================

    #[test]
    fn test_parse_snapshot() {
        let response = response_with(json!({
            "id": { "id": LEDGER },
            "creator": "0xc0ffee",
            "total_tips_received": "1500000000",
            "total_tippers": "2",
            "tips": [
                wrapped_tip("0x1", "1000000000", "a", "10"),
                wrapped_tip("0x2", "500000000", "b", "20")
            ]
        }));
        let snapshot = parse_snapshot(&response).unwrap();
        assert_eq!(snapshot.total_tips_received, 1_500_000_000);
        assert_eq!(snapshot.total_tippers, 2);
        assert_eq!(snapshot.tip_count, 2);
        assert_eq!(snapshot.creator, "0xc0ffee");
    }

    #[test]
    fn test_parse_snapshot_fields_render_as_base10() {
        let response = response_with(json!({
            "creator": "0xc0ffee",
            "total_tips_received": 42,
            "total_tippers": "0",
            "tips": []
        }));
        let snapshot = parse_snapshot(&response).unwrap();
        for rendered in [
            snapshot.total_tips_received.to_string(),
            snapshot.total_tippers.to_string(),
            snapshot.tip_count.to_string(),
        ] {
            assert!(rendered.chars().all(|c| c.is_ascii_digit()));
        }
        assert_eq!(snapshot.total_tips_received, 42);
    }

    #[test]
    fn test_parse_snapshot_object_not_found() {
        let response = json!({ "error": { "code": "notExists", "object_id": LEDGER } });
        assert_eq!(parse_snapshot(&response), Err(TipJarError::InvalidObjectData));
    }

    #[test]
    fn test_parse_snapshot_content_without_fields() {
        let response = json!({ "data": { "content": { "dataType": "package", "disassembled": {} } } });
        assert_eq!(parse_snapshot(&response), Err(TipJarError::InvalidObjectData));
    }

    #[test]
    fn test_parse_snapshot_missing_field_is_error_not_zero() {
        let response = response_with(json!({
            "creator": "0xc0ffee",
            "total_tippers": "1",
            "tips": []
        }));
        assert_eq!(parse_snapshot(&response), Err(TipJarError::InvalidObjectData));
    }

    #[test]
    fn test_parse_snapshot_non_numeric_field_is_error() {
        let response = response_with(json!({
            "creator": "0xc0ffee",
            "total_tips_received": "lots",
            "total_tippers": "1",
            "tips": []
        }));
        assert_eq!(parse_snapshot(&response), Err(TipJarError::InvalidObjectData));
    }

    // ==================== parse_tip_history tests ====================

    #[test]
    fn test_history_sorted_desc_and_truncated() {
        let tips: Vec<Value> = (0..15u64)
            .map(|i| {
                // scramble the order a little
                let ts = (i * 7919) % 101;
                wrapped_tip("0x1", "1", "m", &ts.to_string())
            })
            .collect();
        let history = parse_tip_history(&response_with(json!({ "tips": tips }))).unwrap();

        assert_eq!(history.len(), HISTORY_LIMIT);
        assert!(history.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn test_history_short_list_kept_whole() {
        let response = response_with(json!({
            "tips": [
                wrapped_tip("0xa", "1", "old", "100"),
                wrapped_tip("0xb", "2", "new", "300"),
                wrapped_tip("0xc", "3", "mid", "200")
            ]
        }));
        let history = parse_tip_history(&response).unwrap();
        let messages: Vec<&str> = history.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_history_flat_and_wrapped_shapes_agree() {
        let wrapped = wrapped_tip("0xabc", "250000000", "gm ☕", "1700000000000");
        let flat = json!({
            "sender": "0xabc",
            "amount": "250000000",
            "message": "gm ☕",
            "timestamp": "1700000000000"
        });
        let flat_bytes = json!({
            "sender": "0xabc",
            "amount": 250000000u64,
            "message": "gm ☕".as_bytes(),
            "timestamp": 1700000000000u64
        });

        let a = decode_tip_entry(&wrapped);
        let b = decode_tip_entry(&flat);
        let c = decode_tip_entry(&flat_bytes);
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.message, "gm ☕");
        assert_eq!(a.amount, 250_000_000);
    }

    #[test]
    fn test_history_message_bytes_masked() {
        // 360 & 0xff == 104 ('h'), 361 & 0xff == 105 ('i')
        let entry = json!({ "fields": { "sender": "0x1", "amount": "1", "message": [360, 361], "timestamp": "1" } });
        assert_eq!(decode_tip_entry(&entry).message, "hi");
    }

    #[test]
    fn test_history_invalid_utf8_replaced() {
        let entry = json!({ "fields": { "message": [0xff, 0x61] } });
        assert_eq!(decode_tip_entry(&entry).message, "\u{fffd}a");
    }

    #[test]
    fn test_history_absent_shape_defaults() {
        let tip = decode_tip_entry(&json!(null));
        assert_eq!(tip, Tip::default());

        let tip = decode_tip_entry(&json!({}));
        assert_eq!(tip.sender, "");
        assert_eq!(tip.amount, 0);
        assert_eq!(tip.message, "");
        assert_eq!(tip.timestamp, 0);
    }

    #[test]
    fn test_history_missing_tips_is_empty() {
        let history = parse_tip_history(&response_with(json!({ "creator": "0x1" }))).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_history_invalid_object() {
        assert_eq!(parse_tip_history(&json!({})), Err(TipJarError::InvalidObjectData));
    }

    // ==================== ChainGateway tests ====================

    fn mocked_gateway() -> (ChainGateway<MockProvider>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        (ChainGateway::new(Arc::new(provider), target()), mock)
    }

    #[tokio::test]
    async fn test_gateway_requests_ledger_object_with_content() {
        let (gateway, mock) = mocked_gateway();
        mock.push::<Value, _>(response_with(json!({
            "creator": "0xc0ffee",
            "total_tips_received": "3000000000",
            "total_tippers": "2",
            "tips": [wrapped_tip("0x1", "3000000000", "hey", "5")]
        })))
        .unwrap();

        let snapshot = gateway.fetch_snapshot().await.unwrap();
        assert_eq!(snapshot.total_tips_received, 3_000_000_000);
        assert_eq!(snapshot.tip_count, 1);

        mock.assert_request(
            "sui_getObject",
            (LEDGER, json!({ "showContent": true, "showType": true })),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_gateway_history_goes_through_same_read() {
        let (gateway, mock) = mocked_gateway();
        mock.push::<Value, _>(response_with(json!({
            "tips": [wrapped_tip("0x1", "1", "a", "1"), wrapped_tip("0x2", "2", "b", "2")]
        })))
        .unwrap();

        let history = gateway.fetch_tip_history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message, "b");
        mock.assert_request(
            "sui_getObject",
            (LEDGER, json!({ "showContent": true, "showType": true })),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_gateway_transport_error_is_rpc() {
        // nothing queued: the transport fails the request
        let (gateway, _mock) = mocked_gateway();
        let err = gateway.fetch_snapshot().await.unwrap_err();
        assert!(matches!(err, TipJarError::Rpc(_)), "got {:?}", err);
    }

    #[test]
    fn test_connect_survives_malformed_rpc_override() {
        let mut config = Config::new(PACKAGE, LEDGER, crate::config::Network::Testnet);
        config.rpc_override = Some("fullnode.testnet.sui.io".to_string());
        let gateway = ChainGateway::connect(&config).unwrap();
        assert_eq!(gateway.target().ledger_object_id, LEDGER);
    }

    // ==================== build_tip_transaction tests ====================

    #[test]
    fn test_build_tip_transaction_point_one() {
        let tx = target().build_tip_transaction("0.1", "hi");
        assert_eq!(tx.split_amount(), Some(100_000_000));

        let call = tx.move_call().unwrap();
        assert_eq!(call.target(), format!("{}::sui_buy_me_coffee::buy_coffee", PACKAGE));
        assert_eq!(
            call.arguments,
            vec![Argument::Input(1), Argument::Result(0), Argument::Input(2)]
        );
        assert_eq!(
            tx.input(call.arguments[0]),
            Some(&CallArg::Object { object_id: LEDGER.to_string() })
        );
        assert_eq!(
            tx.input(call.arguments[2]),
            Some(&CallArg::Pure { value: PureValue::String("hi".into()) })
        );
    }

    #[test]
    fn test_build_tip_transaction_split_comes_from_gas() {
        let tx = target().build_tip_transaction("2", "");
        match &tx.commands[0] {
            Command::SplitCoins { coin, amounts } => {
                assert_eq!(*coin, Argument::GasCoin);
                assert_eq!(amounts.len(), 1);
            }
            other => panic!("expected SplitCoins first, got {:?}", other),
        }
        assert_eq!(tx.commands.len(), 2);
    }

    #[test]
    fn test_build_tip_transaction_truncates_not_rounds() {
        let tx = target().build_tip_transaction("1.23456789", "");
        assert_eq!(tx.split_amount(), Some(1_234_567_890));

        let tx = target().build_tip_transaction("1.2345678999", "");
        assert_eq!(tx.split_amount(), Some(1_234_567_899));

        let tx = target().build_tip_transaction("0.0000000019", "");
        assert_eq!(tx.split_amount(), Some(1));
    }
}
