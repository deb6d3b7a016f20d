#![allow(clippy::unwrap_used)]
// Integration tests for `ManagementClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postal_api::{
    CredentialSpec, Error, ManagementClient, OrganizationSpec, ServerMode, ServerSpec,
    ServerUpdate, WebhookSpec,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ManagementClient) {
    let server = MockServer::start().await;
    let key: SecretString = "test-key".to_string().into();
    let client =
        ManagementClient::new(&server.uri(), &key, postal_api::DEFAULT_TIMEOUT).unwrap();
    (server, client)
}

fn api_path(suffix: &str) -> String {
    format!("/management/api/v1/{suffix}")
}

fn success(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "status": "success", "data": data }))
}

// ── Envelope handling ───────────────────────────────────────────────

#[tokio::test]
async fn success_payload_is_returned_unmodified() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("organizations")))
        .and(header("X-Management-API-Key", "test-key"))
        .respond_with(success(json!({
            "organizations": [{
                "uuid": "org-uuid-1",
                "name": "Acme",
                "permalink": "acme",
                "owner_email": "ops@acme.test",
                "time_zone": "UTC",
                "suspended": false
            }]
        })))
        .mount(&server)
        .await;

    let orgs = client.list_organizations().await.unwrap();

    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0].uuid, "org-uuid-1");
    assert_eq!(orgs[0].permalink.as_deref(), Some("acme"));
    assert!(!orgs[0].suspended);
}

#[tokio::test]
async fn error_envelope_round_trips_code_and_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("organizations")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "data": {
                "code": "ValidationError",
                "message": "Name has already been taken",
                "errors": { "name": ["has already been taken"] }
            }
        })))
        .mount(&server)
        .await;

    let result = client
        .create_organization(&OrganizationSpec::new("Acme", "ops@acme.test"))
        .await;

    match result {
        Err(Error::Api {
            code,
            message,
            fields,
        }) => {
            assert_eq!(code, "ValidationError");
            assert_eq!(message, "Name has already been taken");
            let fields = fields.unwrap();
            assert_eq!(fields["name"], vec!["has already been taken"]);
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn error_details_key_is_accepted_for_field_errors() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("servers")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "data": {
                "code": "ValidationError",
                "message": "Server is invalid",
                "details": { "name": ["is too short"] }
            }
        })))
        .mount(&server)
        .await;

    let err = client
        .create_server(&ServerSpec::new("acme", "x"))
        .await
        .unwrap_err();

    assert_eq!(err.field_errors().unwrap()["name"], vec!["is too short"]);
}

#[tokio::test]
async fn non_json_error_page_surfaces_http_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("servers/1")))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client.get_server("1").await.unwrap_err();

    match err {
        Error::Api { code, message, .. } => {
            assert_eq!(code, "502");
            assert!(message.contains("Bad Gateway"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
    // Port 9 is discard; nothing listens there in the test environment.
    let key: SecretString = "test-key".to_string().into();
    let client = ManagementClient::new(
        "http://127.0.0.1:9",
        &key,
        std::time::Duration::from_secs(2),
    )
    .unwrap();

    let result = client.list_organizations().await;

    match result {
        Err(err @ Error::Transport(_)) => {
            assert!(err.is_transient(), "connect failures are worth retrying");
        }
        other => panic!("expected Transport error, got: {other:?}"),
    }
}

// ── Servers ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_server_sends_exact_documented_payload() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("servers")))
        .and(body_json(json!({
            "organization": "acme",
            "name": "S1",
            "ip_pool_id": 1,
            "mode": "Live",
            "message_retention_days": 2,
            "raw_message_retention_days": 2,
            "raw_message_retention_size": 12048
        })))
        .respond_with(success(json!({
            "server": {
                "id": 7,
                "uuid": "srv-uuid",
                "name": "S1",
                "mode": "Live",
                "token": "abc123",
                "full_permalink": "acme/s1"
            },
            "credentials": { "api_key": "generated-key" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let spec = ServerSpec {
        ip_pool_id: Some(1),
        ..ServerSpec::new("acme", "S1")
    };
    let created = client.create_server(&spec).await.unwrap();

    assert_eq!(created.server.id, Some(7));
    assert_eq!(created.server.mode, Some(ServerMode::Live));
    assert_eq!(created.credentials.unwrap().api_key, "generated-key");
}

#[tokio::test]
async fn list_servers_passes_organization_filter() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("servers")))
        .and(query_param("organization", "acme"))
        .respond_with(success(json!({ "servers": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let servers = client.list_servers(Some("acme")).await.unwrap();
    assert!(servers.is_empty());
}

#[tokio::test]
async fn update_server_sends_only_set_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path(api_path("servers/7")))
        .and(body_json(json!({ "name": "Renamed" })))
        .respond_with(success(json!({
            "server": { "uuid": "srv-uuid", "name": "Renamed" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let update = ServerUpdate {
        name: Some("Renamed".into()),
        ..ServerUpdate::default()
    };
    let updated = client.update_server("7", &update).await.unwrap();
    assert_eq!(updated.name, "Renamed");
}

// ── Domains ─────────────────────────────────────────────────────────

#[tokio::test]
async fn add_domain_unwraps_domain_field() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("servers/7/domains")))
        .and(body_json(json!({ "name": "example.com", "auto_verify": true })))
        .respond_with(success(json!({
            "domain": {
                "uuid": "dom-uuid",
                "name": "example.com",
                "verified": true,
                "outgoing": true,
                "spf_record": "v=spf1 a mx ~all",
                "dkim_record_name": "postal-x._domainkey",
                "dkim_record": "v=DKIM1; p=abc",
                "return_path_domain": "rp.postal.test"
            }
        })))
        .mount(&server)
        .await;

    let domain = client.add_domain("7", "example.com", true).await.unwrap();

    assert_eq!(domain.uuid, "dom-uuid");
    assert!(domain.verified);
    assert_eq!(domain.dns_records().len(), 3);
}

#[tokio::test]
async fn check_domain_dns_reports_per_record_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("servers/7/domains/dom-uuid/check_dns")))
        .respond_with(success(json!({
            "dns_ok": false,
            "dns_status": {
                "spf": { "status": "OK" },
                "dkim": { "status": "Missing", "error": "no TXT record found" }
            }
        })))
        .mount(&server)
        .await;

    let check = client.check_domain_dns("7", "dom-uuid").await.unwrap();

    assert!(!check.dns_ok);
    assert_eq!(check.dns_status["spf"].status, "OK");
    assert_eq!(
        check.dns_status["dkim"].error.as_deref(),
        Some("no TXT record found")
    );
}

#[tokio::test]
async fn delete_domain_issues_delete() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(api_path("servers/7/domains/dom-uuid")))
        .respond_with(success(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_domain("7", "dom-uuid").await.unwrap();
}

// ── Credentials & webhooks ──────────────────────────────────────────

#[tokio::test]
async fn smtp_ip_credential_carries_explicit_key() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("servers/7/credentials")))
        .and(body_json(json!({
            "name": "relay",
            "type": "SMTP-IP",
            "hold": false,
            "key": "10.0.0.4"
        })))
        .respond_with(success(json!({
            "credential": {
                "uuid": "cred-uuid",
                "name": "relay",
                "type": "SMTP-IP",
                "key": "10.0.0.4",
                "hold": false
            }
        })))
        .mount(&server)
        .await;

    let credential = client
        .create_credential("7", &CredentialSpec::smtp_ip("relay", "10.0.0.4"))
        .await
        .unwrap();
    assert_eq!(credential.key.as_deref(), Some("10.0.0.4"));
}

#[tokio::test]
async fn create_webhook_subscribes_event_list() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("servers/7/webhooks")))
        .and(body_json(json!({
            "name": "example.com",
            "url": "https://hooks.test/bounces",
            "events": ["MessageBounced"],
            "all_events": false,
            "enabled": true,
            "sign": true
        })))
        .respond_with(success(json!({
            "webhook": {
                "uuid": "hook-uuid",
                "name": "example.com",
                "url": "https://hooks.test/bounces",
                "events": ["MessageBounced"],
                "all_events": false,
                "enabled": true,
                "sign": true
            }
        })))
        .mount(&server)
        .await;

    let spec = WebhookSpec {
        events: Some(vec!["MessageBounced".into()]),
        ..WebhookSpec::new("example.com", "https://hooks.test/bounces")
    };
    let webhook = client.create_webhook("7", &spec).await.unwrap();
    assert_eq!(webhook.uuid, "hook-uuid");
    assert_eq!(webhook.events, ["MessageBounced"]);
}
