use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{ApiClient, ApiResult, de};
use crate::listing::{DataFetcher, ListQuery, ListResult, Record};

/// A role as it appears on a user record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRole {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, rename = "role")]
    pub roles: Vec<UserRole>,
}

impl User {
    pub fn role_names(&self) -> String {
        self.roles
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.iter().any(|r| r.id == role_id)
    }
}

impl Record for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "username" => Some(self.username.clone()),
            "email" => self.email.clone(),
            "firstName" => self.first_name.clone(),
            "lastName" => self.last_name.clone(),
            "roles" => Some(self.role_names()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserPage {
    #[serde(default)]
    data: Vec<User>,
    #[serde(default)]
    count: u64,
}

/// Query parameters for `GET /user`. Search and sort are done server side.
fn user_params(query: &ListQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("pageNo", query.page.to_string()),
        ("limit", query.page_size.to_string()),
    ];
    if let Some(search) = &query.filter_text {
        params.push(("search", search.clone()));
    }
    if let Some(key) = &query.sort_key {
        params.push(("sortBy", key.clone()));
        params.push(("sortOrder", query.sort_order.as_str().to_string()));
    }
    params
}

pub async fn list(client: &ApiClient, query: &ListQuery) -> ApiResult<ListResult<User>> {
    let page: UserPage = client
        .get_json("/user", &user_params(query), "Failed to fetch users")
        .await?;
    Ok(ListResult::new(page.data, page.count))
}

pub async fn add_role(client: &ApiClient, user_id: &str, role: &UserRole) -> ApiResult<()> {
    client
        .send_json(
            Method::PUT,
            &format!("/user/{user_id}/permission/groups/{}", role.id),
            &json!({ "userId": user_id, "groupId": role.id, "name": role.name }),
            "Failed to add role",
        )
        .await
}

pub async fn remove_role(client: &ApiClient, user_id: &str, role_id: &str) -> ApiResult<()> {
    client
        .delete(
            &format!("/user/{user_id}/permission/groups/{role_id}"),
            "Failed to remove role",
        )
        .await
}

pub struct UsersFetcher {
    client: ApiClient,
}

impl UsersFetcher {
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataFetcher<User> for UsersFetcher {
    fn resource(&self) -> &'static str {
        "users"
    }

    async fn fetch(&self, query: &ListQuery) -> ApiResult<ListResult<User>> {
        let page = list(&self.client, query).await?;
        debug!(count = page.items.len(), total = page.total_count, "Fetched users");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::testing::client_for;
    use crate::listing::SortOrder;

    #[tokio::test]
    async fn fetch_sends_paging_search_and_sort() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(query_param("pageNo", "1"))
            .and(query_param("limit", "10"))
            .and(query_param("search", "jo"))
            .and(query_param("sortBy", "username"))
            .and(query_param("sortOrder", "desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": "u-1",
                    "username": "john",
                    "email": "john@example.com",
                    "firstName": "John",
                    "role": [{"id": "g1", "name": "reviewer"}, {"id": "g2", "name": "designer"}]
                }],
                "count": 31
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut query = ListQuery::new(10).with_sort("username", SortOrder::Desc);
        query.set_filter_text("jo");
        let page = UsersFetcher::new(client_for(&server))
            .fetch(&query)
            .await
            .unwrap();

        assert_eq!(page.total_count, 31);
        let user = &page.items[0];
        assert_eq!(user.first_name.as_deref(), Some("John"));
        assert_eq!(user.last_name, None);
        assert_eq!(user.field("roles").as_deref(), Some("reviewer, designer"));
        assert!(user.has_role("g2"));
    }

    #[tokio::test]
    async fn empty_filter_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(query_param_is_missing("search"))
            .and(query_param_is_missing("sortBy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "count": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let mut query = ListQuery::new(10);
        query.set_filter_text("");
        let page = list(&client_for(&server), &query).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn role_membership_paths() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/user/u-1/permission/groups/g1"))
            .and(body_json(json!({"userId": "u-1", "groupId": "g1", "name": "reviewer"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/user/u-1/permission/groups/g1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let role = UserRole {
            id: "g1".to_string(),
            name: "reviewer".to_string(),
        };
        add_role(&client, "u-1", &role).await.unwrap();
        remove_role(&client, "u-1", "g1").await.unwrap();
    }
}
