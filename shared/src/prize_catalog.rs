use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::WheelError;
use crate::validation::validate_hex_color;

/// A single prize that can land under the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Prize {
    #[validate(length(min = 1))]
    pub id: String,
    /// Text shown on the wheel segment, e.g. "10% OFF" or "Free Gift".
    #[serde(rename = "discount")]
    #[validate(length(min = 1))]
    pub label: String,
    #[validate(range(min = 0, max = 100))]
    pub percentage: u8,
    #[serde(rename = "color")]
    #[validate(custom = "validate_hex_color")]
    pub display_color: String,
}

impl Prize {
    pub fn new(id: &str, label: &str, percentage: u8, display_color: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            percentage,
            display_color: display_color.to_string(),
        }
    }
}

/// Ordered, non-empty list of prizes with unique ids. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrizeCatalog {
    prizes: Vec<Prize>,
}

impl PrizeCatalog {
    pub fn new(prizes: Vec<Prize>) -> Result<Self, WheelError> {
        if prizes.is_empty() {
            return Err(WheelError::invalid_catalog("catalog has no prizes"));
        }

        let mut seen = HashSet::with_capacity(prizes.len());
        for prize in &prizes {
            prize.validate().map_err(|e| {
                WheelError::invalid_catalog(format!("prize {:?} is invalid: {}", prize.id, e))
            })?;
            if !seen.insert(prize.id.as_str()) {
                return Err(WheelError::invalid_catalog(format!(
                    "duplicate prize id {:?}",
                    prize.id
                )));
            }
        }

        Ok(Self { prizes })
    }

    pub fn prizes(&self) -> &[Prize] {
        &self.prizes
    }

    pub fn len(&self) -> usize {
        self.prizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prizes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Prize> {
        self.prizes.iter().find(|prize| prize.id == id)
    }

    /// Segments repeat catalog entries, so any index maps back by `index mod len`.
    pub fn prize_for_segment(&self, index: u32) -> &Prize {
        &self.prizes[index as usize % self.prizes.len()]
    }

    /// Prizes in the order they are laid out clockwise from the pointer.
    pub fn display_segments(&self, segment_count: u32) -> Vec<&Prize> {
        (0..segment_count)
            .map(|index| self.prize_for_segment(index))
            .collect()
    }
}

impl Default for PrizeCatalog {
    fn default() -> Self {
        Self {
            prizes: default_prizes(),
        }
    }
}

const YELLOW: &str = "#FCD34D";
const BLACK: &str = "#1F2937";
const RED: &str = "#DC2626";

const PRIZE_TABLE: [(&str, &str, u8); 10] = [
    ("1", "10% OFF", 10),
    ("2", "15% OFF", 15),
    ("3", "20% OFF", 20),
    ("4", "Free Gift", 0),
    ("5", "25% OFF", 25),
    ("6", "5% OFF", 5),
    ("7", "30% OFF", 30),
    ("8", "Buy 1 Get 1", 50),
    ("9", "12% OFF", 12),
    ("10", "18% OFF", 18),
];

/// The catalog served by the backend, alternating yellow and black segments.
pub fn default_prizes() -> Vec<Prize> {
    PRIZE_TABLE
        .iter()
        .enumerate()
        .map(|(i, (id, label, percentage))| {
            let color = if i % 2 == 0 { YELLOW } else { BLACK };
            Prize::new(id, label, *percentage, color)
        })
        .collect()
}

/// What a client shows when the prize fetch fails.
pub fn fallback_prizes() -> Vec<Prize> {
    PRIZE_TABLE
        .iter()
        .map(|(id, label, percentage)| Prize::new(id, label, *percentage, RED))
        .collect()
}

// === API Types ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrizesResponse {
    pub prizes: Vec<Prize>,
}
