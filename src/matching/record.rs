//! Validated match records and their confidence bands

use serde::Deserialize;
use std::fmt;

/// Confidence at or above which a match counts as high confidence
pub const HIGH_CONFIDENCE: f64 = 0.8;

/// Confidence at or above which a match counts as medium confidence
pub const MEDIUM_CONFIDENCE: f64 = 0.6;

/// A proposed redirect from an old URL to a new one
///
/// Invariants: both URLs are non-empty and `confidence` lies in `[0.0, 1.0]`.
/// Records are only built through [`MatchRecord::from_raw`] when they come
/// from the inference service.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub old_url: String,
    pub new_url: String,
    pub confidence: f64,
    pub reason: String,
}

/// Reporting band of a confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfidenceBand {
    /// confidence >= 0.8
    High,
    /// 0.6 <= confidence < 0.8
    Medium,
    /// confidence < 0.6
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= HIGH_CONFIDENCE {
            Self::High
        } else if confidence >= MEDIUM_CONFIDENCE {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        write!(f, "{}", label)
    }
}

/// Why a record from the inference service was dropped
#[derive(Debug, Clone, PartialEq)]
pub enum RecordRejection {
    EmptyOldUrl,
    EmptyNewUrl,
    InvalidConfidence(String),
}

impl fmt::Display for RecordRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyOldUrl => write!(f, "oldUrl is empty"),
            Self::EmptyNewUrl => write!(f, "newUrl is empty"),
            Self::InvalidConfidence(value) => write!(f, "invalid confidence: {}", value),
        }
    }
}

/// A match exactly as the inference service returned it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatch {
    #[serde(default)]
    pub old_url: String,
    #[serde(default)]
    pub new_url: String,
    #[serde(default)]
    pub confidence: Option<RawConfidence>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Models occasionally quote numbers; both forms are accepted
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawConfidence {
    Number(f64),
    Text(String),
}

impl RawConfidence {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl MatchRecord {
    /// Validates a raw match
    ///
    /// URLs are trimmed and must be non-empty. Finite confidences outside
    /// the unit interval are clamped; missing or non-numeric ones reject the
    /// record.
    pub fn from_raw(raw: RawMatch) -> Result<Self, RecordRejection> {
        let old_url = raw.old_url.trim().to_string();
        if old_url.is_empty() {
            return Err(RecordRejection::EmptyOldUrl);
        }

        let new_url = raw.new_url.trim().to_string();
        if new_url.is_empty() {
            return Err(RecordRejection::EmptyNewUrl);
        }

        let confidence = match &raw.confidence {
            Some(value) => value
                .value()
                .filter(|c| c.is_finite())
                .ok_or_else(|| RecordRejection::InvalidConfidence(format!("{:?}", value)))?,
            None => return Err(RecordRejection::InvalidConfidence("missing".to_string())),
        };

        Ok(Self {
            old_url,
            new_url,
            confidence: confidence.clamp(0.0, 1.0),
            reason: raw.reason.unwrap_or_default().trim().to_string(),
        })
    }

    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::from_confidence(self.confidence)
    }
}
