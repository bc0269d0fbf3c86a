//! # Discovery Requests
//!
//! What a caller asks for ([`DiscoveryRequest`]) and what is sent to the
//! agent once the request has been validated ([`SubmitDiscoveryRequest`]).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    #[default]
    Auto,
    SnmpOnly,
    SshOnly,
    PingOnly,
}

impl DiscoveryMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::SnmpOnly => "snmp_only",
            Self::SshOnly => "ssh_only",
            Self::PingOnly => "ping_only",
        }
    }
}

impl fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscoveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(Self::Auto),
            "snmp_only" | "snmp" => Ok(Self::SnmpOnly),
            "ssh_only" | "ssh" => Ok(Self::SshOnly),
            "ping_only" | "ping" => Ok(Self::PingOnly),
            _ => Err(format!("unknown discovery method: {s}")),
        }
    }
}

/// A secret string. Never printed by `Debug` or `Display`; only serialized
/// in clear on the wire request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Login used by the agent for SSH (and SNMP v3 when no separate user is given).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: Secret,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<Secret>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SnmpVersion {
    #[default]
    #[serde(rename = "v2c")]
    V2c,
    #[serde(rename = "v3")]
    V3,
}

impl FromStr for SnmpVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v2c" | "2c" | "2" => Ok(Self::V2c),
            "v3" | "3" => Ok(Self::V3),
            _ => Err(format!("unsupported SNMP version: {s}")),
        }
    }
}

/// SNMP v3 user-based security settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnmpV3Config {
    pub username: String,
    pub security_level: Option<String>,
    pub auth_protocol: Option<String>,
    pub auth_password: Option<Secret>,
    pub priv_protocol: Option<String>,
    pub priv_password: Option<Secret>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnmpParams {
    pub version: SnmpVersion,
    pub community: String,
    pub port: u16,
    pub v3: Option<SnmpV3Config>,
}

impl Default for SnmpParams {
    fn default() -> Self {
        Self {
            version: SnmpVersion::V2c,
            community: "public".to_string(),
            port: 161,
            v3: None,
        }
    }
}

/// A discovery as requested by the caller, before validation.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryRequest {
    pub network_id: Option<String>,
    pub agent_ids: BTreeSet<String>,
    /// Range in any form accepted by [`IpRange`](crate::network::range::IpRange)'s parser.
    pub range: Option<String>,
    pub method: DiscoveryMethod,
    pub credentials: Credentials,
    pub snmp: Option<SnmpParams>,
    pub location: Option<String>,
    pub device_type: Option<String>,
    pub is_auto_discovery: bool,
}

impl DiscoveryRequest {
    pub fn new(network_id: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            network_id: Some(network_id.into()),
            range: Some(range.into()),
            ..Default::default()
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_ids.insert(agent_id.into());
        self
    }

    pub fn with_method(mut self, method: DiscoveryMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_snmp(mut self, snmp: SnmpParams) -> Self {
        self.snmp = Some(snmp);
        self
    }
}

/// Body of the submit call, as the agent expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitDiscoveryRequest {
    pub network_id: String,
    pub agent_ids: Vec<String>,
    pub start_ip: String,
    pub end_ip: String,
    pub discovery_method: DiscoveryMethod,
    pub snmp_version: SnmpVersion,
    pub snmp_community: String,
    pub snmp_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snmp_config: Option<SnmpV3Config>,
    pub credentials: Credentials,
    pub location: Option<String>,
    pub device_type: Option<String>,
    pub is_auto_discovery: bool,
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_short_and_wire_names() {
        assert_eq!("auto".parse::<DiscoveryMethod>(), Ok(DiscoveryMethod::Auto));
        assert_eq!("snmp-only".parse::<DiscoveryMethod>(), Ok(DiscoveryMethod::SnmpOnly));
        assert_eq!("SSH".parse::<DiscoveryMethod>(), Ok(DiscoveryMethod::SshOnly));
        assert_eq!("ping_only".parse::<DiscoveryMethod>(), Ok(DiscoveryMethod::PingOnly));
        assert!("arp".parse::<DiscoveryMethod>().is_err());
    }

    #[test]
    fn secrets_stay_out_of_debug_output() {
        let creds = Credentials::new("admin", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
        assert_eq!(creds.password.expose(), "hunter2");
    }

    #[test]
    fn wire_request_uses_agent_field_names() {
        let request = SubmitDiscoveryRequest {
            network_id: "net-1".into(),
            agent_ids: vec!["agent-a".into()],
            start_ip: "10.0.0.1".into(),
            end_ip: "10.0.0.9".into(),
            discovery_method: DiscoveryMethod::SnmpOnly,
            snmp_version: SnmpVersion::V2c,
            snmp_community: "public".into(),
            snmp_port: 161,
            snmp_config: None,
            credentials: Credentials::new("admin", "hunter2"),
            location: None,
            device_type: None,
            is_auto_discovery: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["discovery_method"], "snmp_only");
        assert_eq!(json["snmp_version"], "v2c");
        assert_eq!(json["credentials"]["password"], "hunter2");
        assert!(json.get("snmp_config").is_none());
    }
}
