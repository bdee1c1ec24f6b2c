use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ApiClient, ApiResult, de};
use crate::listing::{DataFetcher, ListQuery, ListResult, Record, page_locally};

/// A permission group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Role {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Record for Role {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "description" => self.description.clone(),
            _ => None,
        }
    }
}

/// Body for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDraft {
    pub name: String,
    pub description: String,
}

pub async fn list(client: &ApiClient) -> ApiResult<Vec<Role>> {
    client.get_json("/roles", &[], "Failed to fetch roles").await
}

pub async fn create(client: &ApiClient, draft: &RoleDraft) -> ApiResult<()> {
    client
        .send_json(Method::POST, "/roles", draft, "Failed to create role")
        .await
}

pub async fn update(client: &ApiClient, id: &str, draft: &RoleDraft) -> ApiResult<()> {
    client
        .send_json(Method::PUT, &format!("/roles/{id}"), draft, "Failed to update role")
        .await
}

pub async fn delete(client: &ApiClient, id: &str) -> ApiResult<()> {
    client
        .delete(&format!("/roles/{id}"), "Failed to delete role")
        .await
}

/// The roles endpoint has no paging, so the whole list is fetched and
/// paged here.
pub struct RolesFetcher {
    client: ApiClient,
}

impl RolesFetcher {
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataFetcher<Role> for RolesFetcher {
    fn resource(&self) -> &'static str {
        "roles"
    }

    async fn fetch(&self, query: &ListQuery) -> ApiResult<ListResult<Role>> {
        let roles = list(&self.client).await?;
        debug!(count = roles.len(), "Fetched roles");
        Ok(page_locally(roles, query, &["name", "description"]))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::testing::client_for;
    use crate::listing::SortOrder;

    async fn roles_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/roles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "admin", "description": "Admin role"},
                {"id": 2, "name": "reviewer", "description": "Reviews submissions"},
                {"id": "3", "name": "designer"}
            ])))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn fetcher_pages_and_sorts_locally() {
        let server = roles_server().await;
        let fetcher = RolesFetcher::new(client_for(&server));

        let mut query = ListQuery::new(2).with_sort("name", SortOrder::Desc);
        let page = fetcher.fetch(&query).await.unwrap();
        assert_eq!(page.total_count, 3);
        let names: Vec<_> = page.items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["reviewer", "designer"]);

        query.page = 2;
        let page = fetcher.fetch(&query).await.unwrap();
        assert_eq!(page.items[0].id, "1");
    }

    #[tokio::test]
    async fn fetcher_filters_on_description() {
        let server = roles_server().await;
        let fetcher = RolesFetcher::new(client_for(&server));

        let mut query = ListQuery::new(10);
        query.set_filter_text("submissions");
        let page = fetcher.fetch(&query).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].name, "reviewer");
    }

    #[tokio::test]
    async fn mutations_hit_role_paths() {
        let server = MockServer::start().await;
        let draft = RoleDraft {
            name: "auditor".to_string(),
            description: "Read only".to_string(),
        };
        Mock::given(method("POST"))
            .and(path("/roles"))
            .and(body_json(json!({"name": "auditor", "description": "Read only"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/roles/4"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/roles/4"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        create(&client, &draft).await.unwrap();
        update(&client, "4", &draft).await.unwrap();
        delete(&client, "4").await.unwrap();
    }
}
