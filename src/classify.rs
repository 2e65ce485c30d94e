use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{MangoRipenessError, Result};

/// Ripeness categories a hue can fall into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RipenessLabel {
    Unripe,
    PartiallyRipe,
    Ripe,
    Overripe,
    /// Hue does not match any rule
    Undetermined,
}

impl RipenessLabel {
    pub const ALL: [RipenessLabel; 5] = [
        RipenessLabel::Unripe,
        RipenessLabel::PartiallyRipe,
        RipenessLabel::Ripe,
        RipenessLabel::Overripe,
        RipenessLabel::Undetermined,
    ];

    /// Name shown to users and written to exported logs
    pub fn display_name(&self) -> &'static str {
        match self {
            RipenessLabel::Unripe => "Unripe",
            RipenessLabel::PartiallyRipe => "Partially Ripe",
            RipenessLabel::Ripe => "Ripe",
            RipenessLabel::Overripe => "Overripe",
            RipenessLabel::Undetermined => "Can't detect",
        }
    }
}

impl fmt::Display for RipenessLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for RipenessLabel {
    type Err = MangoRipenessError;

    /// Accepts both the display name and the variant name
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        RipenessLabel::ALL
            .iter()
            .copied()
            .find(|label| {
                label.display_name().eq_ignore_ascii_case(s)
                    || format!("{:?}", label).eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| MangoRipenessError::UnknownLabel(s.to_string()))
    }
}

/// Half-open hue interval [start, end) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct HueRange {
    pub start: f64,
    pub end: f64,
}

impl HueRange {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn contains(&self, hue: f64) -> bool {
        self.start <= hue && hue < self.end
    }
}

impl From<[f64; 2]> for HueRange {
    fn from(r: [f64; 2]) -> Self {
        Self::new(r[0], r[1])
    }
}

impl From<HueRange> for [f64; 2] {
    fn from(r: HueRange) -> Self {
        [r.start, r.end]
    }
}

/// A label together with the hue ranges that select it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub label: RipenessLabel,
    pub ranges: Vec<HueRange>,
}

impl ThresholdRule {
    pub fn new(label: RipenessLabel, ranges: Vec<HueRange>) -> Self {
        Self { label, ranges }
    }

    pub fn matches(&self, hue: f64) -> bool {
        self.ranges.iter().any(|r| r.contains(hue))
    }
}

/// Ordered hue rules; the first rule whose range contains the hue wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    rules: Vec<ThresholdRule>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::new(vec![
            ThresholdRule::new(RipenessLabel::Unripe, vec![HueRange::new(80.0, 180.0)]),
            ThresholdRule::new(RipenessLabel::PartiallyRipe, vec![HueRange::new(60.0, 80.0)]),
            ThresholdRule::new(RipenessLabel::Ripe, vec![HueRange::new(40.0, 60.0)]),
            ThresholdRule::new(
                RipenessLabel::Overripe,
                vec![HueRange::new(0.0, 40.0), HueRange::new(330.0, 360.0)],
            ),
        ])
    }
}

impl ThresholdTable {
    pub fn new(rules: Vec<ThresholdRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    /// Map a hue to exactly one label
    pub fn classify(&self, hue: f64) -> RipenessLabel {
        self.rules
            .iter()
            .find(|rule| rule.matches(hue))
            .map(|rule| rule.label)
            .unwrap_or(RipenessLabel::Undetermined)
    }

    /// Check that the table is usable: at least one rule, and every range
    /// satisfies 0 <= start < end <= 360
    pub fn validate(&self) -> Result<()> {
        if self.rules.is_empty() {
            return Err(MangoRipenessError::Config(
                "thresholds must contain at least one rule".to_string(),
            ));
        }

        for rule in &self.rules {
            if rule.ranges.is_empty() {
                return Err(MangoRipenessError::Config(format!(
                    "threshold rule for {} has no hue ranges",
                    rule.label
                )));
            }
            for range in &rule.ranges {
                let in_circle = range.start >= 0.0 && range.end <= 360.0;
                if !in_circle || range.start >= range.end {
                    return Err(MangoRipenessError::Config(format!(
                        "threshold range [{}, {}) for {} must satisfy 0 <= start < end <= 360",
                        range.start, range.end, rule.label
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Classify with the default threshold table
pub fn classify(hue: f64) -> RipenessLabel {
    ThresholdTable::default().classify(hue)
}
