// Hand-crafted async HTTP client for the Postal management API.
//
// Base path: /management/api/v1/
// Auth: X-Management-API-Key header

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::types::{
    CreatedServer, Credential, CredentialSpec, DnsCheck, Domain, IpPool, Organization,
    OrganizationSpec, Server, ServerSpec, ServerUpdate, SystemStatus, VerifyResult, Webhook,
    WebhookSpec, WebhookUpdate,
};

/// Default request timeout, matching the service's own client tooling.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ── Response envelope ────────────────────────────────────────────────

/// Every management API response carries `{ status, data }`; errors ride
/// in `data` as `{ code, message, errors }`.
#[derive(serde::Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    data: Value,
}

#[derive(serde::Deserialize)]
struct ErrorPayload {
    #[serde(default = "unknown_code")]
    code: String,
    #[serde(default = "unknown_message")]
    message: String,
    /// Field-level validation details; some endpoints call this `details`.
    #[serde(default, alias = "details")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl Default for ErrorPayload {
    fn default() -> Self {
        Self {
            code: unknown_code(),
            message: unknown_message(),
            errors: None,
        }
    }
}

fn unknown_code() -> String {
    "Unknown".into()
}

fn unknown_message() -> String {
    "Unknown error".into()
}

// ── Named-field payload wrappers ─────────────────────────────────────

#[derive(serde::Deserialize)]
struct Organizations {
    organizations: Vec<Organization>,
}

#[derive(serde::Deserialize)]
struct OrganizationField {
    organization: Organization,
}

#[derive(serde::Deserialize)]
struct Servers {
    servers: Vec<Server>,
}

#[derive(serde::Deserialize)]
struct ServerField {
    server: Server,
}

#[derive(serde::Deserialize)]
struct Domains {
    domains: Vec<Domain>,
}

#[derive(serde::Deserialize)]
struct DomainField {
    domain: Domain,
}

#[derive(serde::Deserialize)]
struct Credentials {
    credentials: Vec<Credential>,
}

#[derive(serde::Deserialize)]
struct CredentialField {
    credential: Credential,
}

#[derive(serde::Deserialize)]
struct Webhooks {
    webhooks: Vec<Webhook>,
}

#[derive(serde::Deserialize)]
struct WebhookField {
    webhook: Webhook,
}

#[derive(serde::Deserialize)]
struct IpPools {
    ip_pools: Vec<IpPool>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Postal management API.
///
/// Stateless request wrapper: one method per resource operation, each a
/// direct mapping to a path and verb. The only state held across calls is
/// the configured HTTP session (base URL, API-key header, timeout).
pub struct ManagementClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ManagementClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a server URL and management API key.
    ///
    /// Injects `X-Management-API-Key` as a sensitive default header and
    /// applies `timeout` to every request.
    pub fn new(base_url: &str, api_key: &SecretString, timeout: Duration) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|_| Error::InvalidApiKey)?;
        key_value.set_sensitive(true);
        headers.insert("X-Management-API-Key", key_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Append the versioned management prefix to the server root.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/management/api/v1/"));
        Ok(url)
    }

    /// Join a relative path (e.g. `"servers/1/domains"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/v1/`, so joining relative paths works.
        self.base_url
            .join(path)
            .expect("path should be a valid relative URL")
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.unwrap_envelope(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.unwrap_envelope(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.unwrap_envelope(resp).await
    }

    /// POST with no request body (verify, check_dns).
    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("POST {url}");

        let resp = self.http.post(url).send().await?;
        self.unwrap_envelope(resp).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("PATCH {url}");

        let resp = self.http.patch(url).json(body).send().await?;
        self.unwrap_envelope(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path);
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        // Delete payloads carry nothing the caller needs.
        let _: Value = self.unwrap_envelope(resp).await?;
        Ok(())
    }

    // ── Envelope handling ────────────────────────────────────────────

    /// Decode the `{ status, data }` envelope and return `data` unmodified
    /// on success, or an `Error::Api` carrying the service's own code and
    /// message on an application-level error.
    async fn unwrap_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        let envelope: Envelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                let preview: String = body.chars().take(200).collect();
                return Err(Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                });
            }
            // Non-JSON error page (proxy, 404 HTML): surface the HTTP status.
            Err(_) => {
                return Err(Error::Api {
                    code: status.as_u16().to_string(),
                    message: if body.is_empty() {
                        status.to_string()
                    } else {
                        body
                    },
                    fields: None,
                });
            }
        };

        if envelope.status == "error" {
            let payload: ErrorPayload =
                serde_json::from_value(envelope.data).unwrap_or_default();
            return Err(Error::Api {
                code: payload.code,
                message: payload.message,
                fields: payload.errors,
            });
        }

        serde_json::from_value(envelope.data).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── System ───────────────────────────────────────────────────────

    /// Cheap reachability/auth probe.
    pub async fn health_check(&self) -> Result<(), Error> {
        let _: Value = self.get("system/health").await?;
        Ok(())
    }

    pub async fn system_status(&self) -> Result<SystemStatus, Error> {
        self.get("system/status").await
    }

    // ── IP pools ─────────────────────────────────────────────────────

    pub async fn list_ip_pools(&self) -> Result<Vec<IpPool>, Error> {
        let payload: IpPools = self.get("ip_pools").await?;
        Ok(payload.ip_pools)
    }

    pub async fn list_organization_ip_pools(
        &self,
        organization: &str,
    ) -> Result<Vec<IpPool>, Error> {
        let payload: IpPools = self
            .get(&format!("organizations/{organization}/ip_pools"))
            .await?;
        Ok(payload.ip_pools)
    }

    // ── Organizations ────────────────────────────────────────────────

    pub async fn list_organizations(&self) -> Result<Vec<Organization>, Error> {
        let payload: Organizations = self.get("organizations").await?;
        Ok(payload.organizations)
    }

    pub async fn get_organization(&self, permalink: &str) -> Result<Organization, Error> {
        let payload: OrganizationField = self.get(&format!("organizations/{permalink}")).await?;
        Ok(payload.organization)
    }

    pub async fn create_organization(
        &self,
        spec: &OrganizationSpec,
    ) -> Result<Organization, Error> {
        let payload: OrganizationField = self.post("organizations", spec).await?;
        Ok(payload.organization)
    }

    // ── Servers ──────────────────────────────────────────────────────

    /// List servers, optionally filtered by organization permalink.
    pub async fn list_servers(&self, organization: Option<&str>) -> Result<Vec<Server>, Error> {
        let payload: Servers = match organization {
            Some(org) => {
                self.get_with_params("servers", &[("organization", org.to_owned())])
                    .await?
            }
            None => self.get("servers").await?,
        };
        Ok(payload.servers)
    }

    /// `server` may be a numeric id or an `org/server` permalink.
    pub async fn get_server(&self, server: &str) -> Result<Server, Error> {
        let payload: ServerField = self.get(&format!("servers/{server}")).await?;
        Ok(payload.server)
    }

    /// Create a server; the response includes the auto-generated API
    /// credential alongside the server record.
    pub async fn create_server(&self, spec: &ServerSpec) -> Result<CreatedServer, Error> {
        self.post("servers", spec).await
    }

    pub async fn update_server(
        &self,
        server: &str,
        update: &ServerUpdate,
    ) -> Result<Server, Error> {
        let payload: ServerField = self.patch(&format!("servers/{server}"), update).await?;
        Ok(payload.server)
    }

    pub async fn delete_server(&self, server: &str) -> Result<(), Error> {
        self.delete(&format!("servers/{server}")).await
    }

    // ── Domains ──────────────────────────────────────────────────────

    pub async fn list_domains(&self, server: &str) -> Result<Vec<Domain>, Error> {
        let payload: Domains = self.get(&format!("servers/{server}/domains")).await?;
        Ok(payload.domains)
    }

    pub async fn get_domain(&self, server: &str, domain: &str) -> Result<Domain, Error> {
        let payload: DomainField = self
            .get(&format!("servers/{server}/domains/{domain}"))
            .await?;
        Ok(payload.domain)
    }

    /// Add a domain. With `auto_verify` the service marks it verified
    /// immediately; otherwise a DNS TXT verification pass is required.
    pub async fn add_domain(
        &self,
        server: &str,
        name: &str,
        auto_verify: bool,
    ) -> Result<Domain, Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            name: &'a str,
            auto_verify: bool,
        }

        let payload: DomainField = self
            .post(
                &format!("servers/{server}/domains"),
                &Body { name, auto_verify },
            )
            .await?;
        Ok(payload.domain)
    }

    /// Verify domain ownership via its DNS TXT record.
    pub async fn verify_domain(&self, server: &str, domain: &str) -> Result<VerifyResult, Error> {
        self.post_empty(&format!("servers/{server}/domains/{domain}/verify"))
            .await
    }

    /// Check the domain's DNS configuration (SPF, DKIM, return path).
    pub async fn check_domain_dns(&self, server: &str, domain: &str) -> Result<DnsCheck, Error> {
        self.post_empty(&format!("servers/{server}/domains/{domain}/check_dns"))
            .await
    }

    /// All DNS records the service wants configured for the domain.
    /// Shape is service-defined; passed through unchanged.
    pub async fn get_domain_dns_records(
        &self,
        server: &str,
        domain: &str,
    ) -> Result<Value, Error> {
        self.get(&format!("servers/{server}/domains/{domain}/dns_records"))
            .await
    }

    pub async fn delete_domain(&self, server: &str, domain: &str) -> Result<(), Error> {
        self.delete(&format!("servers/{server}/domains/{domain}"))
            .await
    }

    // ── Credentials ──────────────────────────────────────────────────

    pub async fn list_credentials(&self, server: &str) -> Result<Vec<Credential>, Error> {
        let payload: Credentials = self.get(&format!("servers/{server}/credentials")).await?;
        Ok(payload.credentials)
    }

    pub async fn create_credential(
        &self,
        server: &str,
        spec: &CredentialSpec,
    ) -> Result<Credential, Error> {
        let payload: CredentialField = self
            .post(&format!("servers/{server}/credentials"), spec)
            .await?;
        Ok(payload.credential)
    }

    pub async fn delete_credential(&self, server: &str, credential: &str) -> Result<(), Error> {
        self.delete(&format!("servers/{server}/credentials/{credential}"))
            .await
    }

    // ── Webhooks ─────────────────────────────────────────────────────

    pub async fn list_webhooks(&self, server: &str) -> Result<Vec<Webhook>, Error> {
        let payload: Webhooks = self.get(&format!("servers/{server}/webhooks")).await?;
        Ok(payload.webhooks)
    }

    pub async fn create_webhook(
        &self,
        server: &str,
        spec: &WebhookSpec,
    ) -> Result<Webhook, Error> {
        let payload: WebhookField = self
            .post(&format!("servers/{server}/webhooks"), spec)
            .await?;
        Ok(payload.webhook)
    }

    pub async fn update_webhook(
        &self,
        server: &str,
        webhook: &str,
        update: &WebhookUpdate,
    ) -> Result<Webhook, Error> {
        let payload: WebhookField = self
            .patch(&format!("servers/{server}/webhooks/{webhook}"), update)
            .await?;
        Ok(payload.webhook)
    }

    pub async fn delete_webhook(&self, server: &str, webhook: &str) -> Result<(), Error> {
        self.delete(&format!("servers/{server}/webhooks/{webhook}"))
            .await
    }
}
