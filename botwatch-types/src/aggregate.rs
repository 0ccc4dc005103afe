//! Aggregation modes understood by `/api/stats?aggregate_by=`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// How the collector groups per-bot rows before returning them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateBy {
    /// One row per bot.
    #[default]
    None,
    /// One row per reporting host.
    IpAddress,
    /// One row per consumed topic.
    Topic,
    /// One row per consumer group.
    GroupId,
}

impl AggregateBy {
    /// All modes in selection order.
    pub const ALL: [AggregateBy; 4] = [
        AggregateBy::None,
        AggregateBy::IpAddress,
        AggregateBy::Topic,
        AggregateBy::GroupId,
    ];

    /// Parse a query value. Anything other than the three grouping fields
    /// means no aggregation.
    pub fn parse(value: &str) -> Self {
        match value {
            "ip_address" => AggregateBy::IpAddress,
            "topic" => AggregateBy::Topic,
            "group_id" => AggregateBy::GroupId,
            _ => AggregateBy::None,
        }
    }

    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateBy::None => "none",
            AggregateBy::IpAddress => "ip_address",
            AggregateBy::Topic => "topic",
            AggregateBy::GroupId => "group_id",
        }
    }

    /// The row field this mode groups on, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AggregateBy::None => None,
            other => Some(other.as_str()),
        }
    }

    /// Value to send as `aggregate_by`, or `None` to omit the parameter.
    pub fn query_value(&self) -> Option<&'static str> {
        self.field()
    }

    /// Cycle to the next mode.
    pub fn next(self) -> Self {
        match self {
            AggregateBy::None => AggregateBy::IpAddress,
            AggregateBy::IpAddress => AggregateBy::Topic,
            AggregateBy::Topic => AggregateBy::GroupId,
            AggregateBy::GroupId => AggregateBy::None,
        }
    }

    /// Cycle to the previous mode.
    pub fn prev(self) -> Self {
        match self {
            AggregateBy::None => AggregateBy::GroupId,
            AggregateBy::IpAddress => AggregateBy::None,
            AggregateBy::Topic => AggregateBy::IpAddress,
            AggregateBy::GroupId => AggregateBy::Topic,
        }
    }

    /// Display label for the mode.
    pub fn label(&self) -> &'static str {
        match self {
            AggregateBy::None => "None",
            AggregateBy::IpAddress => "IP Address",
            AggregateBy::Topic => "Topic",
            AggregateBy::GroupId => "Group ID",
        }
    }
}

impl fmt::Display for AggregateBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_fields() {
        assert_eq!(AggregateBy::parse("ip_address"), AggregateBy::IpAddress);
        assert_eq!(AggregateBy::parse("topic"), AggregateBy::Topic);
        assert_eq!(AggregateBy::parse("group_id"), AggregateBy::GroupId);
    }

    #[test]
    fn parse_unknown_means_none() {
        assert_eq!(AggregateBy::parse("none"), AggregateBy::None);
        assert_eq!(AggregateBy::parse(""), AggregateBy::None);
        assert_eq!(AggregateBy::parse("bot_id"), AggregateBy::None);
        assert_eq!(AggregateBy::parse("Topic"), AggregateBy::None);
    }

    #[test]
    fn cycle_visits_every_mode() {
        let mut mode = AggregateBy::None;
        for expected in AggregateBy::ALL.iter().skip(1) {
            mode = mode.next();
            assert_eq!(mode, *expected);
        }
        assert_eq!(mode.next(), AggregateBy::None);

        for m in AggregateBy::ALL {
            assert_eq!(m.next().prev(), m);
        }
    }

    #[test]
    fn query_value_omits_none() {
        assert_eq!(AggregateBy::None.query_value(), None);
        assert_eq!(AggregateBy::GroupId.query_value(), Some("group_id"));
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&AggregateBy::IpAddress).unwrap();
        assert_eq!(json, "\"ip_address\"");
        let back: AggregateBy = serde_json::from_str("\"group_id\"").unwrap();
        assert_eq!(back, AggregateBy::GroupId);
    }
}
