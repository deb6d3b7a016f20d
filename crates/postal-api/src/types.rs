//! Request and response types for the Postal management API.
//!
//! Response records pass the service's JSON through unchanged; every
//! identifier (`id`/`uuid`) is assigned by the service, never generated
//! here. Request specs serialize optional fields as absent, not null or
//! empty strings.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Organizations ────────────────────────────────────────────────────

/// Top-level tenant grouping servers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub uuid: String,
    pub name: String,
    pub permalink: Option<String>,
    pub owner_email: Option<String>,
    pub time_zone: Option<String>,
    #[serde(default)]
    pub suspended: bool,
}

/// Payload for `POST /organizations`.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationSpec {
    pub name: String,
    pub owner_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    pub time_zone: String,
}

impl OrganizationSpec {
    /// New organization with the default `UTC` time zone.
    pub fn new(name: impl Into<String>, owner_email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner_email: owner_email.into(),
            permalink: None,
            time_zone: "UTC".into(),
        }
    }
}

// ── Servers ──────────────────────────────────────────────────────────

/// Operating mode of a mail server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerMode {
    Live,
    Development,
}

impl std::fmt::Display for ServerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => f.write_str("Live"),
            Self::Development => f.write_str("Development"),
        }
    }
}

/// A logical mail-sending unit owning domains, credentials, and webhooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Numeric id, when the endpoint includes it.
    pub id: Option<i64>,
    pub uuid: String,
    pub name: String,
    pub mode: Option<ServerMode>,
    pub token: Option<String>,
    #[serde(default)]
    pub suspended: bool,
    pub full_permalink: Option<String>,
    pub organization: Option<OrganizationRef>,
    /// Catch-all for additional fields not modeled above.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Server {
    /// Identifier to use in follow-up request paths. The API accepts the
    /// numeric id or an `org/server` permalink; uuid is the fallback.
    pub fn reference(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => self.uuid.clone(),
        }
    }
}

/// Organization summary embedded in server responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRef {
    pub name: Option<String>,
    pub permalink: Option<String>,
}

/// `POST /servers` response: the server plus its auto-generated credential.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedServer {
    pub server: Server,
    #[serde(default)]
    pub credentials: Option<GeneratedCredentials>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedCredentials {
    pub api_key: String,
}

/// Payload for `POST /servers`.
///
/// `new` fills the fixed defaults: Live mode, 2-day metadata and raw
/// retention, 12048 MB raw retention cap.
#[derive(Debug, Clone, Serialize)]
pub struct ServerSpec {
    /// Organization permalink.
    pub organization: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_pool_id: Option<i64>,
    pub mode: ServerMode,
    pub message_retention_days: u32,
    pub raw_message_retention_days: u32,
    pub raw_message_retention_size: u32,
}

impl ServerSpec {
    pub fn new(organization: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            name: name.into(),
            ip_pool_id: None,
            mode: ServerMode::Live,
            message_retention_days: 2,
            raw_message_retention_days: 2,
            raw_message_retention_size: 12048,
        }
    }
}

/// Partial update for `PATCH /servers/{id}` -- every patchable attribute,
/// all optional, absent fields untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ServerMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_pool_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_retention_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_message_retention_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_message_retention_size: Option<u32>,
}

// ── Domains ──────────────────────────────────────────────────────────

/// A sending/receiving domain attached to a server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    #[serde(default)]
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub outgoing: bool,
    #[serde(default)]
    pub incoming: bool,
    pub dns_verification_string: Option<String>,
    pub spf_record: Option<String>,
    pub dkim_record_name: Option<String>,
    pub dkim_record: Option<String>,
    pub return_path_domain: Option<String>,
    /// Catch-all for additional fields not modeled above.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Domain {
    /// DNS records the operator must configure for this domain, derived
    /// from the verification, SPF, DKIM, and return-path fields.
    pub fn dns_records(&self) -> Vec<DnsRecord> {
        let mut records = Vec::new();

        if let Some(value) = &self.dns_verification_string {
            records.push(DnsRecord {
                record_type: "TXT".into(),
                name: "@".into(),
                value: value.clone(),
                purpose: "Ownership verification".into(),
                required: true,
                priority: None,
            });
        }
        if let Some(value) = &self.spf_record {
            records.push(DnsRecord {
                record_type: "TXT".into(),
                name: "@".into(),
                value: value.clone(),
                purpose: "SPF".into(),
                required: true,
                priority: None,
            });
        }
        if let (Some(name), Some(value)) = (&self.dkim_record_name, &self.dkim_record) {
            records.push(DnsRecord {
                record_type: "TXT".into(),
                name: name.clone(),
                value: value.clone(),
                purpose: "DKIM".into(),
                required: true,
                priority: None,
            });
        }
        if let Some(value) = &self.return_path_domain {
            records.push(DnsRecord {
                record_type: "CNAME".into(),
                name: "psrp".into(),
                value: value.clone(),
                purpose: "Return path".into(),
                required: false,
                priority: None,
            });
        }

        records
    }
}

/// Result of `POST .../domains/{uuid}/verify`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyResult {
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub already_verified: bool,
}

impl VerifyResult {
    pub fn is_verified(&self) -> bool {
        self.verified || self.already_verified
    }
}

/// Result of `POST .../domains/{uuid}/check_dns`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DnsCheck {
    #[serde(default)]
    pub dns_ok: bool,
    /// Refreshed domain record, when the service includes it.
    pub domain: Option<Domain>,
    /// Per-record status keyed by record kind (spf, dkim, ...).
    #[serde(default)]
    pub dns_status: BTreeMap<String, RecordCheck>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordCheck {
    #[serde(default)]
    pub status: String,
    pub error: Option<String>,
}

// ── Credentials ──────────────────────────────────────────────────────

/// Credential kind. `SmtpIp` binds the credential to a source IP and
/// requires an explicit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialType {
    #[serde(rename = "API")]
    Api,
    #[serde(rename = "SMTP")]
    Smtp,
    #[serde(rename = "SMTP-IP")]
    SmtpIp,
}

/// An authentication token scoped to a server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub uuid: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
    /// Generated by the service except for SMTP-IP, where it is the bound IP.
    pub key: Option<String>,
    #[serde(default)]
    pub hold: bool,
}

/// Payload for `POST .../credentials`.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
    pub hold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl CredentialSpec {
    /// API credential; the service generates the key.
    pub fn api(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credential_type: CredentialType::Api,
            hold: false,
            key: None,
        }
    }

    /// SMTP credential; the service generates the key.
    pub fn smtp(name: impl Into<String>) -> Self {
        Self {
            credential_type: CredentialType::Smtp,
            ..Self::api(name)
        }
    }

    /// SMTP credential bound to a source IP address.
    pub fn smtp_ip(name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            credential_type: CredentialType::SmtpIp,
            key: Some(ip.into()),
            ..Self::api(name)
        }
    }
}

// ── Webhooks ─────────────────────────────────────────────────────────

/// An HTTP callback subscription for server-side events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub uuid: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub all_events: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub sign: bool,
}

/// Payload for `POST .../webhooks`.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookSpec {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
    pub all_events: bool,
    pub enabled: bool,
    pub sign: bool,
}

impl WebhookSpec {
    /// Enabled, signed webhook with no event subscription yet.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            events: None,
            all_events: false,
            enabled: true,
            sign: true,
        }
    }
}

/// Partial update for `PATCH .../webhooks/{uuid}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WebhookUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign: Option<bool>,
}

// ── IP pools ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpPool {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub ip_addresses: Vec<IpPoolAddress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpPoolAddress {
    pub ip_address: String,
}

// ── System ───────────────────────────────────────────────────────────

/// `GET /system/status` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemStatus {
    pub version: Option<String>,
    pub hostname: Option<String>,
    pub database: Option<ComponentStatus>,
    pub message_db: Option<ComponentStatus>,
    pub queued_worker: Option<WorkerStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentStatus {
    #[serde(default)]
    pub connected: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkerStatus {
    #[serde(default)]
    pub running: bool,
}

// ── DNS record descriptors ───────────────────────────────────────────

/// Client-side descriptor of a DNS record the operator must configure.
/// Never sent to the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnsRecord {
    pub record_type: String,
    pub name: String,
    pub value: String,
    pub purpose: String,
    pub required: bool,
    pub priority: Option<u16>,
}

/// Render DNS record descriptors for direct console display.
pub fn format_dns_records(records: &[DnsRecord]) -> String {
    let mut out = String::new();
    let rule = "-".repeat(50);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "DNS CONFIGURATION REQUIRED");
    let _ = writeln!(out, "{rule}");

    for (i, record) in records.iter().enumerate() {
        let required = if record.required { "" } else { " (optional)" };
        let _ = writeln!(
            out,
            "\n{}. {} ({} record){required}:",
            i + 1,
            record.purpose.to_uppercase(),
            record.record_type
        );
        let _ = writeln!(out, "   Host: {}", record.name);
        let _ = writeln!(out, "   Type: {}", record.record_type);
        if let Some(priority) = record.priority {
            let _ = writeln!(out, "   Priority: {priority}");
        }
        let _ = writeln!(out, "   Value: {}", record.value);
    }

    let _ = writeln!(out, "\n{rule}");
    out
}
