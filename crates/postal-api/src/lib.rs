// postal-api: Async Rust client for the Postal management API

pub mod client;
pub mod error;
pub mod setup;
pub mod types;

pub use client::{DEFAULT_TIMEOUT, ManagementClient};
pub use error::Error;
pub use setup::{DnsPoll, DnsStatus, DnsWait, FullSetup, SetupReport, poll_dns};
pub use types::{
    CreatedServer, Credential, CredentialSpec, CredentialType, DnsCheck, DnsRecord, Domain,
    IpPool, Organization, OrganizationSpec, Server, ServerMode, ServerSpec, ServerUpdate,
    SystemStatus, VerifyResult, Webhook, WebhookSpec, WebhookUpdate, format_dns_records,
};
