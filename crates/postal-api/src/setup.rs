//! Composite "full setup" workflow: server + domain + optional webhook,
//! with a bounded DNS-propagation poll.
//!
//! Steps run strictly in order and each failure propagates immediately;
//! resources created by earlier steps are left in place (no rollback).

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::Error;
use crate::client::ManagementClient;
use crate::types::{DnsCheck, Domain, Server, ServerSpec, Webhook, WebhookSpec};

/// Events subscribed by default when a webhook URL is given without an
/// explicit event list.
pub const DEFAULT_WEBHOOK_EVENTS: [&str; 2] = ["MessageDeliveryFailed", "MessageBounced"];

/// Options for [`ManagementClient::full_setup`].
#[derive(Debug, Clone)]
pub struct FullSetup {
    /// Organization permalink to create the server under.
    pub organization: String,
    pub server_name: String,
    pub domain_name: String,
    pub ip_pool_id: Option<i64>,
    /// When set, a webhook named after the domain is created.
    pub webhook_url: Option<String>,
    /// Overrides [`DEFAULT_WEBHOOK_EVENTS`].
    pub webhook_events: Option<Vec<String>>,
    /// When set, poll DNS until configured or attempts run out.
    pub dns_wait: Option<DnsWait>,
}

impl FullSetup {
    pub fn new(
        organization: impl Into<String>,
        server_name: impl Into<String>,
        domain_name: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            server_name: server_name.into(),
            domain_name: domain_name.into(),
            ip_pool_id: None,
            webhook_url: None,
            webhook_events: None,
            dns_wait: None,
        }
    }
}

/// Bounded fixed-interval DNS poll parameters.
#[derive(Debug, Clone)]
pub struct DnsWait {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for DnsWait {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_attempts: 20,
        }
    }
}

/// Outcome of one bounded DNS poll.
#[derive(Debug)]
pub enum DnsPoll {
    /// DNS reported correctly configured on attempt `attempts`.
    Verified {
        attempts: u32,
        /// Refreshed domain record from the successful check, if provided.
        domain: Option<Domain>,
    },
    /// All attempts exhausted without success. Advisory, not an error:
    /// the operator configures DNS manually.
    TimedOut { attempts: u32 },
}

/// DNS state recorded in a [`SetupReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsStatus {
    Verified { attempts: u32 },
    TimedOut { attempts: u32 },
    /// No DNS wait was requested.
    Skipped,
}

/// Everything `full_setup` provisioned.
#[derive(Debug)]
pub struct SetupReport {
    pub server: Server,
    /// Auto-generated API key for sending, when the service returned one.
    pub api_key: Option<String>,
    pub domain: Domain,
    pub webhook: Option<Webhook>,
    pub dns: DnsStatus,
}

impl ManagementClient {
    /// Provision a working mail-sending setup in one call: create the
    /// server, add the domain (auto-verified), optionally create a bounce
    /// webhook, and optionally wait for DNS propagation.
    pub async fn full_setup(&self, setup: &FullSetup) -> Result<SetupReport, Error> {
        info!(server = %setup.server_name, "creating server");
        let created = self
            .create_server(&ServerSpec {
                ip_pool_id: setup.ip_pool_id,
                ..ServerSpec::new(setup.organization.as_str(), setup.server_name.as_str())
            })
            .await?;

        let server = created.server;
        let api_key = created.credentials.map(|c| c.api_key);
        let server_ref = server.reference();
        info!(server = %server_ref, "server created");

        info!(domain = %setup.domain_name, "adding domain");
        let mut domain = self.add_domain(&server_ref, &setup.domain_name, true).await?;
        info!(domain = %domain.uuid, "domain added");

        let webhook = match &setup.webhook_url {
            Some(url) => {
                let events = setup.webhook_events.clone().unwrap_or_else(|| {
                    DEFAULT_WEBHOOK_EVENTS.iter().map(ToString::to_string).collect()
                });
                let spec = WebhookSpec {
                    events: Some(events),
                    ..WebhookSpec::new(setup.domain_name.as_str(), url.as_str())
                };
                let webhook = self.create_webhook(&server_ref, &spec).await?;
                info!(webhook = %webhook.uuid, "webhook created");
                Some(webhook)
            }
            None => None,
        };

        let dns = match &setup.dns_wait {
            None => DnsStatus::Skipped,
            Some(wait) => {
                info!("waiting for DNS configuration");
                let outcome =
                    poll_dns(wait, || self.check_domain_dns(&server_ref, &domain.uuid)).await?;
                match outcome {
                    DnsPoll::Verified {
                        attempts,
                        domain: refreshed,
                    } => {
                        if let Some(refreshed) = refreshed {
                            domain = refreshed;
                        }
                        info!(attempts, "DNS configured correctly");
                        DnsStatus::Verified { attempts }
                    }
                    DnsPoll::TimedOut { attempts } => {
                        warn!(attempts, "DNS check timed out, configure records manually");
                        DnsStatus::TimedOut { attempts }
                    }
                }
            }
        };

        Ok(SetupReport {
            server,
            api_key,
            domain,
            webhook,
            dns,
        })
    }
}

/// Poll a DNS check up to `wait.max_attempts` times, sleeping
/// `wait.interval` between attempts and stopping on the first check that
/// reports DNS as configured.
///
/// Exhausting the attempts is reported as [`DnsPoll::TimedOut`], not an
/// error; only check failures themselves (transport, API) propagate.
pub async fn poll_dns<F, Fut>(wait: &DnsWait, mut check: F) -> Result<DnsPoll, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<DnsCheck, Error>>,
{
    for attempt in 1..=wait.max_attempts {
        let result = check().await?;
        if result.dns_ok {
            return Ok(DnsPoll::Verified {
                attempts: attempt,
                domain: result.domain,
            });
        }
        if attempt < wait.max_attempts {
            tracing::debug!(attempt, max = wait.max_attempts, "DNS not ready, waiting");
            tokio::time::sleep(wait.interval).await;
        }
    }
    Ok(DnsPoll::TimedOut {
        attempts: wait.max_attempts,
    })
}
