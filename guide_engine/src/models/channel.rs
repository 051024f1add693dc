use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::api::ChannelId;

/// Broadcast wave classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChannelType {
    /// Terrestrial
    GR,
    /// Broadcast satellite
    BS,
    /// Communication satellite / cable
    CS,
    SKY,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::GR => "GR",
            ChannelType::BS => "BS",
            ChannelType::CS => "CS",
            ChannelType::SKY => "SKY",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GR" => Ok(Self::GR),
            "BS" => Ok(Self::BS),
            "CS" => Ok(Self::CS),
            "SKY" => Ok(Self::SKY),
            _ => Err(format!("Unknown channel type: {}", s)),
        }
    }
}

/// A broadcast channel as returned by the schedule provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    /// Full-width display name
    pub name: String,
    /// Half-width display name
    pub half_width_name: String,
    pub channel_type: ChannelType,
    #[serde(default)]
    pub service_id: Option<i64>,
    #[serde(default)]
    pub remote_control_key_id: Option<i64>,
}

impl Channel {
    pub fn new(id: i64, name: impl Into<String>, channel_type: ChannelType) -> Self {
        let name = name.into();
        Self {
            id: ChannelId::new(id),
            half_width_name: name.clone(),
            name,
            channel_type,
            service_id: None,
            remote_control_key_id: None,
        }
    }

    pub fn with_half_width_name(mut self, name: impl Into<String>) -> Self {
        self.half_width_name = name.into();
        self
    }
}

/// A channel placed at its grid column.
///
/// Column indices follow the order in which the schedule provider returned the
/// channels and do not change for the lifetime of a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub index: usize,
    pub channel: Channel,
}

/// Which channels a schedule fetch should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ChannelFilter {
    All,
    Type(ChannelType),
    Single(ChannelId),
}

impl ChannelFilter {
    pub fn matches(&self, channel: &Channel) -> bool {
        match self {
            ChannelFilter::All => true,
            ChannelFilter::Type(t) => channel.channel_type == *t,
            ChannelFilter::Single(id) => channel.id == *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_type_parse() {
        assert_eq!("gr".parse::<ChannelType>().unwrap(), ChannelType::GR);
        assert_eq!("SKY".parse::<ChannelType>().unwrap(), ChannelType::SKY);
        assert!("UHF".parse::<ChannelType>().is_err());
    }

    #[test]
    fn test_channel_type_serde() {
        let json = serde_json::to_string(&ChannelType::BS).unwrap();
        assert_eq!(json, "\"BS\"");
    }

    #[test]
    fn test_filter_matches() {
        let nhk = Channel::new(1, "NHK", ChannelType::GR);
        let bs = Channel::new(2, "BS1", ChannelType::BS);

        assert!(ChannelFilter::All.matches(&nhk));
        assert!(ChannelFilter::Type(ChannelType::GR).matches(&nhk));
        assert!(!ChannelFilter::Type(ChannelType::GR).matches(&bs));
        assert!(ChannelFilter::Single(ChannelId::new(2)).matches(&bs));
        assert!(!ChannelFilter::Single(ChannelId::new(2)).matches(&nhk));
    }
}
