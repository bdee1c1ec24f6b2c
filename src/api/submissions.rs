use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ApiClient, ApiResult, de};
use crate::listing::{DataFetcher, ListQuery, ListResult, Record, SortOrder};

const SUBMISSIONS_QUERY: &str = r"
query GetSubmission($limit: Int, $pageNo: Int, $sortOrder: String, $sortBy: String) {
  getSubmission(limit: $limit, pageNo: $pageNo, sortOrder: $sortOrder, sortBy: $sortBy) {
    submissions {
      id
      formName
      createdBy
      created
      applicationStatus
    }
    totalCount
    pageNo
    limit
  }
}";

/// Column the backend sorts by when none is chosen.
pub const DEFAULT_SORT: &str = "created";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub form_name: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub application_status: Option<String>,
}

impl Submission {
    /// Submission date in local time, or the raw value if it does not parse.
    pub fn created_display(&self) -> String {
        self.created.as_deref().map(format_timestamp).unwrap_or_default()
    }
}

/// The backend sends RFC 3339 timestamps, or naive ones meaning UTC.
fn format_timestamp(raw: &str) -> String {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc()));
    match parsed {
        Ok(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

impl Record for Submission {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "formName" => Some(self.form_name.clone()),
            "id" => Some(self.id.clone()),
            "createdBy" => self.created_by.clone(),
            "created" => self.created.as_ref().map(|_| self.created_display()),
            "applicationStatus" => self.application_status.clone(),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables<'a> {
    limit: u32,
    page_no: u32,
    sort_order: &'a str,
    sort_by: &'a str,
}

impl<'a> Variables<'a> {
    fn from_query(query: &'a ListQuery) -> Self {
        let (sort_by, sort_order) = query
            .sort_key
            .as_deref()
            .map_or((DEFAULT_SORT, SortOrder::Desc), |key| (key, query.sort_order));
        Self {
            limit: query.page_size,
            page_no: query.page,
            sort_order: sort_order.as_str(),
            sort_by,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionPage {
    #[serde(default)]
    submissions: Vec<Submission>,
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    page_no: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Data {
    get_submission: SubmissionPage,
}

pub async fn list(client: &ApiClient, query: &ListQuery) -> ApiResult<ListResult<Submission>> {
    let data: Data = client
        .graphql(
            SUBMISSIONS_QUERY,
            &Variables::from_query(query),
            "Failed to fetch submissions",
        )
        .await?;
    let page = data.get_submission;
    if let Some(page_no) = page.page_no
        && page_no != query.page
    {
        debug!(requested = query.page, returned = page_no, "Backend answered a different page");
    }
    Ok(ListResult::new(page.submissions, page.total_count))
}

pub struct SubmissionsFetcher {
    client: ApiClient,
}

impl SubmissionsFetcher {
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataFetcher<Submission> for SubmissionsFetcher {
    fn resource(&self) -> &'static str {
        "submissions"
    }

    async fn fetch(&self, query: &ListQuery) -> ApiResult<ListResult<Submission>> {
        list(&self.client, query).await
    }
}
