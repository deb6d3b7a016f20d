//! Interactive menu flows.
//!
//! Each flow reads from and writes to a [`Console`], so every path here
//! can be exercised with scripted input. API failures inside a flow are
//! reported on the console and return the user to the menu; only I/O
//! errors on the console itself propagate.

use std::io::{self, BufRead, Write};

use postal_api::{
    Domain, ManagementClient, Organization, OrganizationSpec, Server, ServerMode, ServerSpec,
    format_dns_records,
};

use crate::console::Console;
use crate::output::{DomainRow, OrgRow, ServerRow, render_table};

/// Top-level menu loop. Runs until the user exits or input hits EOF.
pub async fn main_menu<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
) -> io::Result<()> {
    loop {
        console.header("Postal administration")?;
        console.plain("  1. Quick add domain (guided)")?;
        console.plain("  2. List organizations")?;
        console.plain("  3. List servers")?;
        console.plain("  4. Manage domains on a server")?;
        console.plain("  5. Create organization")?;
        console.plain("  6. Create server")?;
        console.plain("  7. System status")?;
        console.plain("  0. Exit")?;
        let Some(choice) = console.prompt("Choose an option")? else {
            break;
        };
        match choice.as_str() {
            "1" => quick_add(api, console).await?,
            "2" => list_organizations_view(api, console).await?,
            "3" => list_servers_view(api, console).await?,
            "4" => manage_domains(api, console).await?,
            "5" => {
                create_organization_interactive(api, console).await?;
            }
            "6" => create_server_flow(api, console).await?,
            "7" => show_system_status(api, console).await?,
            "0" | "q" | "exit" | "quit" => break,
            "" => {}
            _ => console.error("Unknown option.")?,
        }
    }
    console.plain("Goodbye!")
}

/// Guided flow: organization, server, domain, in one pass. Each step
/// reuses an existing resource when one is picked, and offers to create
/// one otherwise. Also reachable directly via `--quick-add`.
pub async fn quick_add<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
) -> io::Result<()> {
    console.header("Quick add domain")?;

    let Some(org) = get_or_create_organization(api, console).await? else {
        return Ok(());
    };
    let Some(server) = get_or_create_server(api, console, &org).await? else {
        return Ok(());
    };
    let Some(domain) = add_domain_interactive(api, console, &server).await? else {
        return Ok(());
    };

    console.success(&format!(
        "Domain {} is set up on server {}.",
        domain.name, server.name
    ))
}

// ── Organizations ────────────────────────────────────────────────────

async fn get_or_create_organization<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
) -> io::Result<Option<Organization>> {
    let orgs = match api.list_organizations().await {
        Ok(orgs) => orgs,
        Err(err) => {
            report_api_error(console, "Could not list organizations", &err)?;
            return Ok(None);
        }
    };

    if !orgs.is_empty() {
        if let Some(org) = console.select("Organizations", &orgs, org_label)? {
            return Ok(Some(org.clone()));
        }
    }
    if !console.confirm("Create a new organization?", orgs.is_empty())? {
        return Ok(None);
    }
    create_organization_interactive(api, console).await
}

async fn create_organization_interactive<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
) -> io::Result<Option<Organization>> {
    console.header("New organization")?;
    let Some(name) = console.prompt("Organization name")? else {
        return Ok(None);
    };
    if name.is_empty() {
        console.error("A name is required.")?;
        return Ok(None);
    }
    let Some(owner_email) = console.prompt("Owner email")? else {
        return Ok(None);
    };
    let suggested = name.to_lowercase().replace(' ', "-");
    let Some(permalink) = console.prompt_default("Permalink", &suggested)? else {
        return Ok(None);
    };
    let Some(time_zone) = console.prompt_default("Time zone", "UTC")? else {
        return Ok(None);
    };

    let spec = OrganizationSpec {
        permalink: Some(permalink),
        time_zone,
        ..OrganizationSpec::new(name, owner_email)
    };
    match api.create_organization(&spec).await {
        Ok(org) => {
            console.success(&format!("Organization {} created.", org.name))?;
            Ok(Some(org))
        }
        Err(err) => {
            report_api_error(console, "Could not create organization", &err)?;
            Ok(None)
        }
    }
}

async fn list_organizations_view<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
) -> io::Result<()> {
    match api.list_organizations().await {
        Ok(orgs) if orgs.is_empty() => console.info("No organizations found."),
        Ok(orgs) => {
            console.plain(&render_table(orgs.iter().map(OrgRow::from)))?;
            console.pause()
        }
        Err(err) => report_api_error(console, "Could not list organizations", &err),
    }
}

// ── Servers ──────────────────────────────────────────────────────────

async fn get_or_create_server<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
    org: &Organization,
) -> io::Result<Option<Server>> {
    let org_ref = org_reference(org);
    let servers = match api.list_servers(Some(&org_ref)).await {
        Ok(servers) => servers,
        Err(err) => {
            report_api_error(console, "Could not list servers", &err)?;
            return Ok(None);
        }
    };

    if !servers.is_empty() {
        if let Some(server) = console.select("Servers", &servers, server_label)? {
            return Ok(Some(server.clone()));
        }
    }
    if !console.confirm("Create a new server?", servers.is_empty())? {
        return Ok(None);
    }
    create_server_interactive(api, console, &org_ref).await
}

async fn create_server_interactive<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
    org_ref: &str,
) -> io::Result<Option<Server>> {
    console.header("New server")?;
    let Some(name) = console.prompt("Server name")? else {
        return Ok(None);
    };
    if name.is_empty() {
        console.error("A name is required.")?;
        return Ok(None);
    }

    let mode = if console.confirm("Run in Live mode (Development holds all mail)?", true)? {
        ServerMode::Live
    } else {
        ServerMode::Development
    };

    // IP pool assignment is optional and only offered when pools exist.
    let ip_pool_id = match api.list_organization_ip_pools(org_ref).await {
        Ok(pools) if !pools.is_empty() => console
            .select("IP pools (0 for the default pool)", &pools, |pool| {
                format!("{} ({} addresses)", pool.name, pool.ip_addresses.len())
            })?
            .map(|pool| pool.id),
        _ => None,
    };

    let spec = ServerSpec {
        ip_pool_id,
        mode,
        ..ServerSpec::new(org_ref, name)
    };
    match api.create_server(&spec).await {
        Ok(created) => {
            console.success(&format!("Server {} created.", created.server.name))?;
            if let Some(credentials) = created.credentials {
                console.info(&format!("Generated API key: {}", credentials.api_key))?;
                console.plain("Store it now; it is not shown again.")?;
            }
            Ok(Some(created.server))
        }
        Err(err) => {
            report_api_error(console, "Could not create server", &err)?;
            Ok(None)
        }
    }
}

async fn create_server_flow<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
) -> io::Result<()> {
    let orgs = match api.list_organizations().await {
        Ok(orgs) => orgs,
        Err(err) => return report_api_error(console, "Could not list organizations", &err),
    };
    if orgs.is_empty() {
        return console.info("No organizations found. Create an organization first.");
    }
    let Some(org) = console.select("Organizations", &orgs, org_label)? else {
        return Ok(());
    };
    let org_ref = org_reference(org);
    create_server_interactive(api, console, &org_ref).await?;
    Ok(())
}

async fn list_servers_view<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
) -> io::Result<()> {
    match api.list_servers(None).await {
        Ok(servers) if servers.is_empty() => console.info("No servers found."),
        Ok(servers) => {
            console.plain(&render_table(servers.iter().map(ServerRow::from)))?;
            console.pause()
        }
        Err(err) => report_api_error(console, "Could not list servers", &err),
    }
}

// ── Domains ──────────────────────────────────────────────────────────

async fn manage_domains<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
) -> io::Result<()> {
    let servers = match api.list_servers(None).await {
        Ok(servers) => servers,
        Err(err) => return report_api_error(console, "Could not list servers", &err),
    };
    if servers.is_empty() {
        return console.info("No servers found.");
    }
    let Some(server) = console.select("Servers", &servers, server_label)? else {
        return Ok(());
    };
    let server = server.clone();
    domain_menu(api, console, &server).await
}

async fn domain_menu<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
    server: &Server,
) -> io::Result<()> {
    loop {
        console.header(&format!("Domains on {}", server.name))?;
        console.plain("  1. List domains")?;
        console.plain("  2. Add domain")?;
        console.plain("  3. Verify domain")?;
        console.plain("  4. Check DNS")?;
        console.plain("  5. Delete domain")?;
        console.plain("  0. Back")?;
        let Some(choice) = console.prompt("Choose an option")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => list_domains_view(api, console, server).await?,
            "2" => {
                add_domain_interactive(api, console, server).await?;
            }
            "3" => verify_domain_menu(api, console, server).await?,
            "4" => check_dns_menu(api, console, server).await?,
            "5" => delete_domain_menu(api, console, server).await?,
            "0" => return Ok(()),
            "" => {}
            _ => console.error("Unknown option.")?,
        }
    }
}

async fn list_domains_view<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
    server: &Server,
) -> io::Result<()> {
    match api.list_domains(&server.reference()).await {
        Ok(domains) if domains.is_empty() => console.info("No domains on this server."),
        Ok(domains) => console.plain(&render_table(domains.iter().map(DomainRow::from))),
        Err(err) => report_api_error(console, "Could not list domains", &err),
    }
}

async fn add_domain_interactive<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
    server: &Server,
) -> io::Result<Option<Domain>> {
    let Some(raw) = console.prompt("Domain name")? else {
        return Ok(None);
    };
    let name = normalize_domain(&raw);
    if name.is_empty() {
        console.error("A domain name is required.")?;
        return Ok(None);
    }

    let auto_verify = console.confirm("Verify via DNS automatically?", true)?;
    let server_ref = server.reference();
    let domain = match api.add_domain(&server_ref, &name, auto_verify).await {
        Ok(domain) => domain,
        Err(err) => {
            report_api_error(console, "Could not add domain", &err)?;
            return Ok(None);
        }
    };
    console.success(&format!("Domain {} added.", domain.name))?;

    let records = domain.dns_records();
    if !records.is_empty() {
        console.plain(&format_dns_records(&records))?;
    }

    if !domain.verified && console.confirm("Try to verify the domain now?", false)? {
        verify_domain(api, console, &server_ref, &domain).await?;
    }
    Ok(Some(domain))
}

async fn verify_domain<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
    server_ref: &str,
    domain: &Domain,
) -> io::Result<bool> {
    match api.verify_domain(server_ref, &domain.uuid).await {
        Ok(result) if result.is_verified() => {
            console.success(&format!("Domain {} verified.", domain.name))?;
            Ok(true)
        }
        Ok(_) => {
            console.info("Not verified yet; DNS may still be propagating.")?;
            Ok(false)
        }
        Err(err) => {
            report_api_error(console, "Verification failed", &err)?;
            Ok(false)
        }
    }
}

async fn verify_domain_menu<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
    server: &Server,
) -> io::Result<()> {
    let server_ref = server.reference();
    let domains = match api.list_domains(&server_ref).await {
        Ok(domains) => domains,
        Err(err) => return report_api_error(console, "Could not list domains", &err),
    };
    let unverified: Vec<Domain> = domains.into_iter().filter(|d| !d.verified).collect();
    if unverified.is_empty() {
        return console.info("All domains on this server are verified.");
    }
    let Some(domain) = console.select("Unverified domains", &unverified, domain_label)? else {
        return Ok(());
    };
    verify_domain(api, console, &server_ref, domain).await?;
    Ok(())
}

async fn check_dns_menu<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
    server: &Server,
) -> io::Result<()> {
    let server_ref = server.reference();
    let domains = match api.list_domains(&server_ref).await {
        Ok(domains) => domains,
        Err(err) => return report_api_error(console, "Could not list domains", &err),
    };
    if domains.is_empty() {
        return console.info("No domains on this server.");
    }
    let Some(domain) = console.select("Domains", &domains, domain_label)? else {
        return Ok(());
    };

    match api.check_domain_dns(&server_ref, &domain.uuid).await {
        Ok(check) => {
            if check.dns_ok {
                console.success(&format!("DNS for {} is configured correctly.", domain.name))?;
            } else {
                console.error(&format!("DNS for {} is not fully configured.", domain.name))?;
            }
            for (record, status) in &check.dns_status {
                let line = match &status.error {
                    Some(error) => format!("  {record}: {} ({error})", status.status),
                    None => format!("  {record}: {}", status.status),
                };
                console.plain(&line)?;
            }
            if !check.dns_ok {
                let current = check.domain.as_ref().unwrap_or(domain);
                let records = current.dns_records();
                if !records.is_empty() {
                    console.plain(&format_dns_records(&records))?;
                }
            }
            Ok(())
        }
        Err(err) => report_api_error(console, "DNS check failed", &err),
    }
}

async fn delete_domain_menu<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
    server: &Server,
) -> io::Result<()> {
    let server_ref = server.reference();
    let domains = match api.list_domains(&server_ref).await {
        Ok(domains) => domains,
        Err(err) => return report_api_error(console, "Could not list domains", &err),
    };
    if domains.is_empty() {
        return console.info("No domains on this server.");
    }
    let Some(domain) = console.select("Domains", &domains, domain_label)? else {
        return Ok(());
    };
    if !console.confirm(&format!("Really delete {}?", domain.name), false)? {
        return console.info("Nothing deleted.");
    }
    match api.delete_domain(&server_ref, &domain.uuid).await {
        Ok(()) => console.success(&format!("Domain {} deleted.", domain.name)),
        Err(err) => report_api_error(console, "Could not delete domain", &err),
    }
}

// ── System ───────────────────────────────────────────────────────────

async fn show_system_status<R: BufRead, W: Write>(
    api: &ManagementClient,
    console: &mut Console<R, W>,
) -> io::Result<()> {
    let status = match api.system_status().await {
        Ok(status) => status,
        Err(err) => return report_api_error(console, "Could not read system status", &err),
    };

    console.header("System status")?;
    if let Some(version) = &status.version {
        console.plain(&format!("Version:  {version}"))?;
    }
    if let Some(hostname) = &status.hostname {
        console.plain(&format!("Hostname: {hostname}"))?;
    }
    if let Some(database) = &status.database {
        console.plain(&format!("Database: {}", connected(database.connected)))?;
    }
    if let Some(message_db) = &status.message_db {
        console.plain(&format!("Message DB: {}", connected(message_db.connected)))?;
    }
    if let Some(worker) = &status.queued_worker {
        let state = if worker.running { "running" } else { "STOPPED" };
        console.plain(&format!("Worker:   {state}"))?;
    }
    console.pause()
}

fn connected(up: bool) -> &'static str {
    if up { "connected" } else { "DISCONNECTED" }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Identifier used in request paths for an organization.
fn org_reference(org: &Organization) -> String {
    org.permalink.clone().unwrap_or_else(|| org.uuid.clone())
}

fn org_label(org: &Organization) -> String {
    match &org.permalink {
        Some(permalink) => format!("{} ({permalink})", org.name),
        None => org.name.clone(),
    }
}

fn server_label(server: &Server) -> String {
    let mode = server
        .mode
        .map(|m| format!(" [{m}]"))
        .unwrap_or_default();
    match &server.organization {
        Some(org) => match org.name.as_deref().or(org.permalink.as_deref()) {
            Some(owner) => format!("{} ({owner}){mode}", server.name),
            None => format!("{}{mode}", server.name),
        },
        None => format!("{}{mode}", server.name),
    }
}

fn domain_label(domain: &Domain) -> String {
    if domain.verified {
        format!("{} [verified]", domain.name)
    } else {
        format!("{} [unverified]", domain.name)
    }
}

/// Normalize free-form domain input: lowercase, strip any URL scheme,
/// and drop everything from the first slash on.
fn normalize_domain(input: &str) -> String {
    let mut name = input.trim().to_lowercase();
    for scheme in ["https://", "http://"] {
        if let Some(rest) = name.strip_prefix(scheme) {
            name = rest.to_string();
            break;
        }
    }
    match name.find('/') {
        Some(idx) => name[..idx].to_string(),
        None => name,
    }
}

fn report_api_error<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    context: &str,
    err: &postal_api::Error,
) -> io::Result<()> {
    console.error(&format!("{context}: {err}"))?;
    if let Some(fields) = err.field_errors() {
        for (field, messages) in fields {
            for message in messages {
                console.plain(&format!("  {field}: {message}"))?;
            }
        }
    }
    Ok(())
}
