//! Message decoder
//!
//! Turns a raw feed message (JSON bytes) into normalized pool events. Two
//! steps: field-class numeric coercion over the raw tree, then mapping of the
//! wire shape into `PoolEvent`.
//!
//! The coercion attempt order is a per-field-class contract, not a
//! heuristic to improve on: `"80"` under a hex-first field is 128, under a
//! decimal-first field it is 80. Changing the order silently changes every
//! downstream number.

use serde::Deserialize;
use serde_json::{Number, Value};

use crate::error::{Error, Result};
use crate::event::numeric::{lenient_decimals, lenient_f64, lenient_i64, parse_hex_f64};
use crate::event::{Currency, Liquidity, PoolEvent, PriceTable, PriceTier};

/// Fields whose string values are tried as hexadecimal integers first.
const HEX_FIRST_FIELDS: &[&str] = &[
    "Number",
    "BaseFee",
    "ParentNumber",
    "PreBalance",
    "PostBalance",
    "MaxAmountIn",
    "MaxAmountOut",
    "MinAmountOut",
    "MinAmountIn",
    "AmountCurrencyA",
    "AmountCurrencyB",
];

/// Fields whose string values are tried as decimal numbers first.
const DECIMAL_FIRST_FIELDS: &[&str] = &["SlippageBasisPoints", "Price", "AtoBPrice", "BtoAPrice"];

/// Decode one raw feed message into normalized pool events.
pub fn decode_message(raw: &[u8]) -> Result<Vec<PoolEvent>> {
    let mut value: Value =
        serde_json::from_slice(raw).map_err(|e| Error::Decode(e.to_string()))?;

    coerce_numeric_fields(&mut value);

    let message: WireMessage =
        serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))?;

    Ok(message.pool_events.into_iter().map(Into::into).collect())
}

/// Recursively coerce known numeric fields from string to number, leaving
/// unparseable values as their original strings.
pub fn coerce_numeric_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if let Value::String(s) = child {
                    if !s.is_empty() {
                        let coerced = if HEX_FIRST_FIELDS.contains(&key.as_str()) {
                            hex_number(s).or_else(|| decimal_number(s))
                        } else if DECIMAL_FIRST_FIELDS.contains(&key.as_str()) {
                            decimal_number(s).or_else(|| hex_number(s))
                        } else {
                            None
                        };
                        if let Some(coerced) = coerced {
                            *child = coerced;
                        }
                    }
                    continue;
                }
                coerce_numeric_fields(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                coerce_numeric_fields(item);
            }
        }
        _ => {}
    }
}

/// Parse a hexadecimal integer (optional sign, optional 0x prefix).
fn hex_number(s: &str) -> Option<Value> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let digits = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
        .unwrap_or(rest);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    if let Ok(v) = u64::from_str_radix(digits, 16) {
        let number = if negative {
            i64::try_from(v)
                .ok()
                .map(|v| Number::from(-v))
                .or_else(|| Number::from_f64(-(v as f64)))
        } else {
            Some(Number::from(v))
        };
        return number.map(Value::Number);
    }

    // Wider than u64: chain reserves and balances get here.
    let v = parse_hex_f64(digits)?;
    Number::from_f64(if negative { -v } else { v }).map(Value::Number)
}

/// Parse a decimal number: float when a dot is present, integer otherwise.
/// Scientific notation is deliberately not accepted here; a string like
/// "1e5" falls through to the hex attempt of its field class.
fn decimal_number(s: &str) -> Option<Value> {
    if s.contains('.') {
        return s.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number);
    }

    if let Ok(v) = s.parse::<i64>() {
        return Some(Value::Number(v.into()));
    }
    if let Ok(v) = s.parse::<u64>() {
        return Some(Value::Number(v.into()));
    }

    // Integer too wide for 64 bits: keep it as a float.
    let body = s.strip_prefix('-').unwrap_or(s);
    if !body.is_empty() && body.chars().all(|c| c.is_ascii_digit()) {
        return s.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number);
    }

    None
}

// Wire shape of the feed's pool event messages. Everything defaults so a
// partial message degrades instead of failing.

#[derive(Debug, Default, Deserialize)]
struct WireMessage {
    #[serde(rename = "PoolEvents", default)]
    pool_events: Vec<WirePoolEvent>,
}

#[derive(Debug, Default, Deserialize)]
struct WirePoolEvent {
    #[serde(rename = "Pool", default)]
    pool: WirePool,
    #[serde(rename = "Liquidity", default)]
    liquidity: WireLiquidity,
    #[serde(rename = "PoolPriceTable", default)]
    price_table: Option<WirePriceTable>,
    #[serde(rename = "TransactionHeader", default)]
    header: WireTxHeader,
}

#[derive(Debug, Default, Deserialize)]
struct WirePool {
    #[serde(rename = "PoolId", default)]
    pool_id: String,
    #[serde(rename = "SmartContract", default)]
    smart_contract: String,
    #[serde(rename = "CurrencyA", default)]
    currency_a: WireCurrency,
    #[serde(rename = "CurrencyB", default)]
    currency_b: WireCurrency,
}

#[derive(Debug, Deserialize)]
struct WireCurrency {
    #[serde(rename = "Symbol", default)]
    symbol: String,
    #[serde(
        rename = "Decimals",
        default = "default_decimals",
        deserialize_with = "lenient_decimals"
    )]
    decimals: u32,
}

impl Default for WireCurrency {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            decimals: default_decimals(),
        }
    }
}

fn default_decimals() -> u32 {
    18
}

#[derive(Debug, Default, Deserialize)]
struct WireLiquidity {
    #[serde(rename = "AmountCurrencyA", default, deserialize_with = "lenient_f64")]
    amount_a: f64,
    #[serde(rename = "AmountCurrencyB", default, deserialize_with = "lenient_f64")]
    amount_b: f64,
}

#[derive(Debug, Default, Deserialize)]
struct WirePriceTable {
    #[serde(rename = "AtoBPrice", default, deserialize_with = "lenient_f64")]
    a_to_b_price: f64,
    #[serde(rename = "BtoAPrice", default, deserialize_with = "lenient_f64")]
    b_to_a_price: f64,
    #[serde(rename = "AtoBPrices", default)]
    a_to_b_tiers: Vec<WireTier>,
    #[serde(rename = "BtoAPrices", default)]
    b_to_a_tiers: Vec<WireTier>,
}

#[derive(Debug, Default, Deserialize)]
struct WireTier {
    #[serde(
        rename = "SlippageBasisPoints",
        default,
        deserialize_with = "lenient_f64"
    )]
    slippage_bp: f64,
    #[serde(rename = "MaxAmountIn", default, deserialize_with = "lenient_f64")]
    max_amount_in: f64,
    #[serde(rename = "MaxAmountOut", default, deserialize_with = "lenient_f64")]
    max_amount_out: f64,
    #[serde(rename = "Price", default, deserialize_with = "lenient_f64")]
    price: f64,
}

#[derive(Debug, Default, Deserialize)]
struct WireTxHeader {
    #[serde(rename = "Time", default, deserialize_with = "lenient_i64")]
    time: i64,
}

impl From<WirePoolEvent> for PoolEvent {
    fn from(wire: WirePoolEvent) -> Self {
        PoolEvent {
            pool_id: wire.pool.pool_id,
            pool_address: wire.pool.smart_contract,
            currency_a: Currency {
                symbol: wire.pool.currency_a.symbol,
                decimals: wire.pool.currency_a.decimals,
            },
            currency_b: Currency {
                symbol: wire.pool.currency_b.symbol,
                decimals: wire.pool.currency_b.decimals,
            },
            liquidity: Liquidity {
                amount_a: wire.liquidity.amount_a,
                amount_b: wire.liquidity.amount_b,
            },
            price_table: wire.price_table.map(|table| PriceTable {
                a_to_b_price: table.a_to_b_price,
                b_to_a_price: table.b_to_a_price,
                a_to_b_tiers: table.a_to_b_tiers.into_iter().map(Into::into).collect(),
                b_to_a_tiers: table.b_to_a_tiers.into_iter().map(Into::into).collect(),
            }),
            time_ns: wire.header.time,
        }
    }
}

impl From<WireTier> for PriceTier {
    fn from(wire: WireTier) -> Self {
        PriceTier {
            slippage_bp: wire.slippage_bp,
            max_amount_in: wire.max_amount_in,
            max_amount_out: wire.max_amount_out,
            price: wire.price,
        }
    }
}
