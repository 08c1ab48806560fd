//! Shared campaign vocabulary used by validation, segmentation and storage.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Delivery channel for a campaign message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    Both,
}

impl Channel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "email" => Some(Self::Email),
            "sms" => Some(Self::Sms),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Both => "both",
        }
    }

    pub fn includes_email(&self) -> bool {
        matches!(self, Self::Email | Self::Both)
    }

    pub fn includes_sms(&self) -> bool {
        matches!(self, Self::Sms | Self::Both)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    OneTime,
    Recurring,
}

impl CampaignType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "one_time" => Some(Self::OneTime),
            "recurring" => Some(Self::Recurring),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneTime => "one_time",
            Self::Recurring => "recurring",
        }
    }
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Sent,
}

/// Treat `None`, `""` and whitespace-only text as unset.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
}

/// Deserialize an optional form field, mapping `null`, `""` and
/// whitespace-only strings to `None`. Use with `#[serde(default)]`.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => T::deserialize(value).map(Some).map_err(de::Error::custom),
    }
}

/// Like [`empty_as_none`], falling back to `T::default()` for unset input.
pub fn empty_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    empty_as_none(deserializer).map(Option::unwrap_or_default)
}
