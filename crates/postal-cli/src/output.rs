//! Table rendering for list views.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use postal_api::{Domain, Organization, Server};

#[derive(Tabled)]
pub struct OrgRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Permalink")]
    permalink: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Organization> for OrgRow {
    fn from(org: &Organization) -> Self {
        Self {
            name: org.name.clone(),
            permalink: org.permalink.clone().unwrap_or_default(),
            owner: org.owner_email.clone().unwrap_or_default(),
            status: if org.suspended { "SUSPENDED" } else { "active" }.to_string(),
        }
    }
}

#[derive(Tabled)]
pub struct ServerRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Organization")]
    organization: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Server> for ServerRow {
    fn from(server: &Server) -> Self {
        Self {
            name: server.name.clone(),
            organization: server
                .organization
                .as_ref()
                .and_then(|org| org.name.clone().or_else(|| org.permalink.clone()))
                .unwrap_or_default(),
            mode: server.mode.map(|m| m.to_string()).unwrap_or_default(),
            status: if server.suspended { "SUSPENDED" } else { "active" }.to_string(),
        }
    }
}

#[derive(Tabled)]
pub struct DomainRow {
    #[tabled(rename = "Domain")]
    name: String,
    #[tabled(rename = "Verified")]
    verified: String,
    #[tabled(rename = "Directions")]
    directions: String,
}

impl From<&Domain> for DomainRow {
    fn from(domain: &Domain) -> Self {
        let directions = match (domain.outgoing, domain.incoming) {
            (true, true) => "in+out",
            (true, false) => "out",
            (false, true) => "in",
            (false, false) => "-",
        };
        Self {
            name: domain.name.clone(),
            verified: if domain.verified { "yes" } else { "NO" }.to_string(),
            directions: directions.to_string(),
        }
    }
}

pub fn render_table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}
