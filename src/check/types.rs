// src/check/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Metric window the server evaluates a campaign's ads over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckPeriod {
    #[default]
    Today,
    Last2Days,
    Last3Days,
    Last7Days,
    AllTime,
}

impl CheckPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckPeriod::Today => "today",
            CheckPeriod::Last2Days => "last2days",
            CheckPeriod::Last3Days => "last3days",
            CheckPeriod::Last7Days => "last7days",
            CheckPeriod::AllTime => "alltime",
        }
    }
}

impl fmt::Display for CheckPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "today" => Ok(CheckPeriod::Today),
            "last2days" => Ok(CheckPeriod::Last2Days),
            "last3days" => Ok(CheckPeriod::Last3Days),
            "last7days" => Ok(CheckPeriod::Last7Days),
            "alltime" => Ok(CheckPeriod::AllTime),
            other => Err(format!("unknown check period: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub campaign_id: String,
    pub period: CheckPeriod,
}

impl CheckRequest {
    pub fn new(campaign_id: impl Into<String>, period: CheckPeriod) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            period,
        }
    }
}

/// How a status value is classified. Variants are listed in display
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusKind {
    Disabled,
    Warning,
    Active,
    Other,
}

/// Ad status exactly as the server reported it. Classification is
/// case-insensitive; the original text is kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub struct AdStatus {
    raw: String,
}

impl AdStatus {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn kind(&self) -> StatusKind {
        match self.raw.to_lowercase().as_str() {
            "disabled" => StatusKind::Disabled,
            "warning" => StatusKind::Warning,
            "active" => StatusKind::Active,
            _ => StatusKind::Other,
        }
    }

    pub fn label(&self) -> &str {
        &self.raw
    }
}

impl From<&str> for AdStatus {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for AdStatus {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<Option<String>> for AdStatus {
    fn from(raw: Option<String>) -> Self {
        raw.map(AdStatus::from).unwrap_or_default()
    }
}

impl From<AdStatus> for String {
    fn from(status: AdStatus) -> Self {
        status.raw
    }
}

/// One evaluated advertisement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdResult {
    pub ad_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: AdStatus,
    #[serde(default)]
    pub spend: Option<f64>,
    #[serde(default)]
    pub conversions: Option<u64>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Started,
    Completed,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Body of both the check-start and the check-status endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckResponse {
    /// Absent or unrecognised values read as `Unknown`, which a poll treats
    /// as still pending.
    #[serde(default)]
    pub status: CheckStatus,
    #[serde(default)]
    pub check_id: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<AdResult>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StartBody {
    pub check_period: CheckPeriod,
}
