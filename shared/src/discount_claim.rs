use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::prize_catalog::Prize;

// === API Types ===

/// Contact details the winner submits to receive a discount code.
///
/// Every field defaults when absent so the server can answer with its own
/// "missing fields" message instead of a deserialization error. `discount` and
/// `percentage` are informational (the catalog is authoritative), so values of
/// the wrong shape are dropped rather than failing the whole body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SendDiscountRequest {
    pub name: String,
    pub email: String,
    pub dob: Option<String>,
    pub prize_id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub discount: String,
    #[serde(deserialize_with = "lenient_percentage")]
    pub percentage: Option<u8>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    })
}

fn lenient_percentage<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let percentage = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(percentage
        .filter(|p| p.fract() == 0.0 && (0.0..=100.0).contains(p))
        .map(|p| p as u8))
}

impl SendDiscountRequest {
    pub fn for_prize(name: &str, email: &str, dob: Option<&str>, prize: &Prize) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            dob: dob.map(str::to_string),
            prize_id: prize.id.clone(),
            discount: prize.label.clone(),
            percentage: Some(prize.percentage),
        }
    }

    pub fn has_required_fields(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.prize_id.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendDiscountResponse {
    pub success: bool,
    pub message: String,
    pub discount_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
