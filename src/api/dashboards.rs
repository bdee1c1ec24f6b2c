use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ApiClient, ApiResult, de};
use crate::listing::{DataFetcher, ListQuery, ListResult, Record, page_locally};

#[derive(Debug, Clone, Deserialize)]
pub struct Dashboard {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
}

/// `GET /dashboards` answers either with a bare list or wrapped in
/// `{"results": [...]}` depending on the analytics backend.
#[derive(Deserialize)]
#[serde(untagged)]
enum DashboardList {
    Plain(Vec<Dashboard>),
    Wrapped { results: Vec<Dashboard> },
}

impl From<DashboardList> for Vec<Dashboard> {
    fn from(list: DashboardList) -> Self {
        match list {
            DashboardList::Plain(dashboards) | DashboardList::Wrapped { results: dashboards } => {
                dashboards
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceDetails {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Authorization {
    #[serde(deserialize_with = "de::id")]
    resource_id: String,
    #[serde(default)]
    resource_details: ResourceDetails,
    #[serde(default)]
    roles: Vec<String>,
}

/// A dashboard and the groups allowed to see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardAuthorization {
    pub id: String,
    pub name: String,
    pub roles: Vec<String>,
}

impl DashboardAuthorization {
    pub fn role_list(&self) -> String {
        self.roles.join(", ")
    }
}

impl Record for DashboardAuthorization {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "roles" => Some(self.role_list()),
            _ => None,
        }
    }
}

/// Every dashboard, with the groups from its authorization record.
/// Dashboards without a record have no groups.
fn join(dashboards: Vec<Dashboard>, authorizations: Vec<Authorization>) -> Vec<DashboardAuthorization> {
    let mut roles: HashMap<String, Vec<String>> = authorizations
        .into_iter()
        .map(|a| (a.resource_id, a.roles))
        .collect();

    dashboards
        .into_iter()
        .map(|d| DashboardAuthorization {
            roles: roles.remove(&d.id).unwrap_or_default(),
            id: d.id,
            name: d.name,
        })
        .collect()
}

pub async fn list(client: &ApiClient) -> ApiResult<Vec<DashboardAuthorization>> {
    let (dashboards, authorizations) = tokio::try_join!(
        client.get_json::<DashboardList>("/dashboards", &[], "Failed to fetch dashboards"),
        client.get_json::<Vec<Authorization>>(
            "/authorizations/dashboard",
            &[],
            "Failed to fetch dashboard authorizations"
        ),
    )?;
    Ok(join(dashboards.into(), authorizations))
}

/// Replace the groups allowed to see a dashboard.
pub async fn update_roles(
    client: &ApiClient,
    dashboard: &DashboardAuthorization,
    roles: Vec<String>,
) -> ApiResult<()> {
    let body = Authorization {
        resource_id: dashboard.id.clone(),
        resource_details: ResourceDetails {
            name: dashboard.name.clone(),
        },
        roles,
    };
    client
        .send_json(
            Method::PUT,
            &format!("/authorizations/dashboard/{}", dashboard.id),
            &body,
            "Failed to update dashboard authorization",
        )
        .await
}

pub struct DashboardsFetcher {
    client: ApiClient,
}

impl DashboardsFetcher {
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataFetcher<DashboardAuthorization> for DashboardsFetcher {
    fn resource(&self) -> &'static str {
        "dashboards"
    }

    async fn fetch(&self, query: &ListQuery) -> ApiResult<ListResult<DashboardAuthorization>> {
        let rows = list(&self.client).await?;
        debug!(count = rows.len(), "Fetched dashboard authorizations");
        Ok(page_locally(rows, query, &["name", "roles"]))
    }
}
