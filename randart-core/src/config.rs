use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{RandartError, Result};

/// Two-stage soft ceiling: past `high` an increment passes one time in two,
/// past `very_high` one time in six.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftCeiling {
    pub high: i16,
    pub very_high: i16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftCeilings {
    pub pval: SoftCeiling,
    pub to_h: SoftCeiling,
    pub to_d: SoftCeiling,
    pub to_a: SoftCeiling,
}

impl Default for SoftCeilings {
    fn default() -> Self {
        Self {
            pval: SoftCeiling {
                high: 4,
                very_high: 6,
            },
            to_h: SoftCeiling {
                high: 16,
                very_high: 26,
            },
            to_d: SoftCeiling {
                high: 16,
                very_high: 26,
            },
            to_a: SoftCeiling {
                high: 26,
                very_high: 36,
            },
        }
    }
}

/// Magnitudes past which an item is inhibited outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardCeilings {
    pub blows: i16,
    pub shots: i16,
    pub might: i16,
    pub speed: i16,
    pub pval: i16,
    pub to_a: i16,
    pub dice: u8,
}

impl Default for HardCeilings {
    fn default() -> Self {
        Self {
            blows: 3,
            shots: 3,
            might: 4,
            speed: 20,
            pval: 10,
            to_a: 75,
            dice: 15,
        }
    }
}

/// Minimum count per structural category for a generated set to be kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetMinimums {
    pub swords: usize,
    pub polearms: usize,
    pub blunts: usize,
    pub bows: usize,
    pub body_armor: usize,
    pub shields: usize,
    pub cloaks: usize,
    pub headgear: usize,
    pub gloves: usize,
    pub boots: usize,
}

impl Default for SetMinimums {
    fn default() -> Self {
        Self {
            swords: 5,
            polearms: 5,
            blunts: 5,
            bows: 4,
            body_armor: 5,
            shields: 4,
            cloaks: 4,
            headgear: 4,
            gloves: 4,
            boots: 4,
        }
    }
}

/// Every tuned constant of the generator. Missing JSON fields take their
/// defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub max_tries: u32,
    pub max_set_tries: u32,
    pub window_low: f64,
    pub window_high: f64,
    pub base_power_fraction: f64,
    pub aggravate_power: i32,
    pub special_indices: Vec<usize>,
    pub soft_ceilings: SoftCeilings,
    pub hard_ceilings: HardCeilings,
    pub set_minimums: SetMinimums,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_tries: 200,
            max_set_tries: 50,
            window_low: 0.9,
            window_high: 1.15,
            base_power_fraction: 0.6,
            aggravate_power: 80,
            special_indices: vec![13, 34, 111],
            soft_ceilings: SoftCeilings::default(),
            hard_ceilings: HardCeilings::default(),
            set_minimums: SetMinimums::default(),
        }
    }
}

impl Tuning {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let tuning: Tuning = serde_json::from_str(&text)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tries == 0 || self.max_set_tries == 0 {
            return Err(RandartError::Config(
                "retry budgets must be at least 1".to_string(),
            ));
        }
        if !(self.window_low > 0.0 && self.window_low <= 1.0 && self.window_high >= 1.0) {
            return Err(RandartError::Config(format!(
                "acceptance window {}..{} must bracket 1.0",
                self.window_low, self.window_high
            )));
        }
        if !(0.0..=1.0).contains(&self.base_power_fraction) {
            return Err(RandartError::Config(format!(
                "base_power_fraction {} is outside 0..=1",
                self.base_power_fraction
            )));
        }
        for c in [
            self.soft_ceilings.pval,
            self.soft_ceilings.to_h,
            self.soft_ceilings.to_d,
            self.soft_ceilings.to_a,
        ] {
            if c.high > c.very_high {
                return Err(RandartError::Config(format!(
                    "soft ceiling {} exceeds its very-high stage {}",
                    c.high, c.very_high
                )));
            }
        }
        Ok(())
    }

    /// Inclusive power window for an item whose template scored `original`.
    pub fn window(&self, original: i32) -> PowerWindow {
        let o = f64::from(original);
        let (a, b) = ((o * self.window_low).ceil(), (o * self.window_high).floor());
        // Negative originals flip the ordering.
        let (low, high) = if a <= b {
            (a, b)
        } else {
            (b.ceil(), a.floor())
        };
        PowerWindow {
            low: low as i32,
            high: high as i32,
        }
    }

    pub fn is_special(&self, index: usize) -> bool {
        self.special_indices.contains(&index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerWindow {
    pub low: i32,
    pub high: i32,
}

impl PowerWindow {
    pub fn contains(&self, power: i32) -> bool {
        (self.low..=self.high).contains(&power)
    }
}
