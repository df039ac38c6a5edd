//! WAF source-address filtering.
//!
//! The Front Door policy carries one custom rule that blocks every request
//! whose socket address is outside the configured allow-list. An empty list
//! blocks everything. [`WafIpFilter::allows`] evaluates the same rule locally.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::settings::StackSettings;

/// Name of the custom IP rule.
pub const IP_RULE_NAME: &str = "AllowOnlyOrganizationIP";

/// Priority of the custom IP rule.
pub const IP_RULE_PRIORITY: u32 = 100;

/// An IPv4 or IPv6 CIDR block. A bare address is a full-length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpRange {
    network: IpAddr,
    prefix_len: u8,
}

impl IpRange {
    pub fn network(&self) -> IpAddr {
        self.network
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Returns true for `0.0.0.0/0` and `::/0`.
    pub fn is_any(&self) -> bool {
        self.prefix_len == 0
    }

    /// Returns true when `ip` is inside this block. Families never match each other.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (ip, self.network) {
            (IpAddr::V4(ip), IpAddr::V4(network)) => {
                let ip_bits: u32 = ip.into();
                let network_bits: u32 = network.into();
                let mask: u32 = (!0u32)
                    .checked_shl(32 - self.prefix_len as u32)
                    .unwrap_or(0);
                (ip_bits & mask) == (network_bits & mask)
            }
            (IpAddr::V6(ip), IpAddr::V6(network)) => {
                let ip_bits: u128 = ip.into();
                let network_bits: u128 = network.into();
                let mask: u128 = (!0u128)
                    .checked_shl(128 - self.prefix_len as u32)
                    .unwrap_or(0);
                (ip_bits & mask) == (network_bits & mask)
            }
            _ => false,
        }
    }
}

impl FromStr for IpRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s, None),
        };

        let network: IpAddr = addr
            .parse()
            .map_err(|_| Error::Config(format!("'{}' is not an IP address or CIDR block", s)))?;
        let max = if network.is_ipv4() { 32 } else { 128 };
        let prefix_len = match prefix {
            Some(p) => p
                .parse::<u8>()
                .ok()
                .filter(|len| *len <= max)
                .ok_or_else(|| {
                    Error::Config(format!("'{}' has an invalid prefix length (max {})", s, max))
                })?,
            None => max,
        };

        Ok(Self {
            network,
            prefix_len,
        })
    }
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl Serialize for IpRange {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses a list of ranges read from configuration `key`.
pub fn parse_ranges(key: &str, values: &[String]) -> Result<Vec<IpRange>> {
    values
        .iter()
        .map(|v| {
            v.parse::<IpRange>().map_err(|e| match e {
                Error::Config(message) => Error::invalid_config(key, message),
                other => other,
            })
        })
        .collect()
}

/// `waf:params`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WafParams {
    pub allowed_ip_ranges: Vec<String>,
}

impl WafParams {
    /// Reads the optional `waf:params` object.
    pub fn from_settings(settings: &StackSettings) -> Result<Self> {
        let params: Self = settings
            .namespace("waf")
            .get_object("params")?
            .unwrap_or_default();
        parse_ranges("waf:params.allowedIpRanges", &params.allowed_ip_ranges)?;
        Ok(params)
    }

    pub fn filter(&self) -> Result<WafIpFilter> {
        Ok(WafIpFilter::new(parse_ranges(
            "waf:params.allowedIpRanges",
            &self.allowed_ip_ranges,
        )?))
    }
}

/// The allow-list rule of the WAF policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WafIpFilter {
    allowed: Vec<IpRange>,
}

impl WafIpFilter {
    pub fn new(allowed: Vec<IpRange>) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self) -> &[IpRange] {
        &self.allowed
    }

    /// Returns true when a request from `ip` passes the rule.
    pub fn allows(&self, ip: IpAddr) -> bool {
        self.allowed.iter().any(|range| range.contains(ip))
    }

    pub fn blocks_everything(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Match condition of the blocking rule.
    ///
    /// With an allow-list the rule matches addresses outside it (negated match).
    /// Without one it matches every address of both families.
    pub fn match_condition(&self) -> Value {
        if self.allowed.is_empty() {
            json!({
                "matchVariable": "SocketAddr",
                "operator": "IPMatch",
                "negateCondition": false,
                "matchValue": ["0.0.0.0/0", "::/0"],
            })
        } else {
            json!({
                "matchVariable": "SocketAddr",
                "operator": "IPMatch",
                "negateCondition": true,
                "matchValue": self.allowed,
            })
        }
    }

    /// The complete custom rule.
    pub fn custom_rule(&self) -> Value {
        json!({
            "name": IP_RULE_NAME,
            "action": "Block",
            "priority": IP_RULE_PRIORITY,
            "ruleType": "MatchRule",
            "matchConditions": [self.match_condition()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_cidr() {
        let range: IpRange = "10.0.0.0/8".parse().unwrap();
        assert_eq!(range.prefix_len(), 8);
        assert_eq!(range.to_string(), "10.0.0.0/8");

        let single: IpRange = "203.0.113.7".parse().unwrap();
        assert_eq!(single.prefix_len(), 32);

        let v6: IpRange = "2001:db8::/32".parse().unwrap();
        assert!(v6.contains(ip("2001:db8::1")));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("10.0.0.0/33".parse::<IpRange>().is_err());
        assert!("not-an-ip".parse::<IpRange>().is_err());
        assert!("10.0.0.0/x".parse::<IpRange>().is_err());
    }

    #[test]
    fn test_contains() {
        let range: IpRange = "192.168.1.0/24".parse().unwrap();
        assert!(range.contains(ip("192.168.1.200")));
        assert!(!range.contains(ip("192.168.2.1")));
        assert!(!range.contains(ip("::1")));

        let any: IpRange = "0.0.0.0/0".parse().unwrap();
        assert!(any.is_any());
        assert!(any.contains(ip("8.8.8.8")));
    }

    #[test]
    fn test_empty_filter_blocks_everything() {
        let filter = WafIpFilter::default();
        assert!(filter.blocks_everything());
        assert!(!filter.allows(ip("10.1.2.3")));
        assert!(!filter.allows(ip("2001:db8::1")));

        let condition = filter.match_condition();
        assert_eq!(condition["negateCondition"], false);
        assert_eq!(condition["matchValue"], json!(["0.0.0.0/0", "::/0"]));
    }

    #[test]
    fn test_allow_list_filter() {
        let filter = WafIpFilter::new(vec!["198.51.100.0/24".parse().unwrap()]);
        assert!(filter.allows(ip("198.51.100.10")));
        assert!(!filter.allows(ip("198.51.101.10")));

        let rule = filter.custom_rule();
        assert_eq!(rule["name"], IP_RULE_NAME);
        assert_eq!(rule["matchConditions"][0]["negateCondition"], true);
        assert_eq!(
            rule["matchConditions"][0]["matchValue"],
            json!(["198.51.100.0/24"])
        );
    }

    #[test]
    fn test_parse_ranges_reports_key() {
        let err = parse_ranges("waf:params.allowedIpRanges", &["nope".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref key, .. }
            if key == "waf:params.allowedIpRanges"));
    }
}
