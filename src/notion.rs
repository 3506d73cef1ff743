//! Notion document capability: create a page, append block children.
//!
//! Only two endpoints are used:
//!
//! | Call | Endpoint |
//! |------|----------|
//! | [`DocumentApi::create_page`]     | `POST  /v1/pages` |
//! | [`DocumentApi::append_children`] | `PATCH /v1/blocks/{id}/children` |
//!
//! Both accept at most [`crate::block::BLOCKS_PER_REQUEST`] children; the
//! publisher is responsible for chunking.

use crate::block::Block;
use crate::error::{Md2NotionError, NotionApiError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Default Notion API base URL.
pub const NOTION_API_BASE: &str = "https://api.notion.com";

/// Notion API version sent in the `Notion-Version` header.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Kind of object the new page is created under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentKind {
    Database,
    Page,
}

impl ParentKind {
    /// Title used when none is configured.
    pub fn default_title(self) -> &'static str {
        match self {
            ParentKind::Database => "Uploaded Markdown",
            ParentKind::Page => "Uploaded Markdown Page",
        }
    }
}

impl FromStr for ParentKind {
    type Err = Md2NotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "database" => Ok(ParentKind::Database),
            "page" => Ok(ParentKind::Page),
            other => Err(Md2NotionError::InvalidParentType {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ParentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentKind::Database => f.write_str("database"),
            ParentKind::Page => f.write_str("page"),
        }
    }
}

/// Where the new page lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub kind: ParentKind,
    pub id: String,
}

impl ParentRef {
    pub fn database(id: impl Into<String>) -> Self {
        Self {
            kind: ParentKind::Database,
            id: id.into(),
        }
    }

    pub fn page(id: impl Into<String>) -> Self {
        Self {
            kind: ParentKind::Page,
            id: id.into(),
        }
    }

    /// The `parent` object of a create-page request.
    pub fn to_json(&self) -> Value {
        match self.kind {
            ParentKind::Database => json!({ "database_id": self.id }),
            ParentKind::Page => json!({ "page_id": self.id }),
        }
    }
}

/// Page creation and block appending.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Create a page titled `title` under `parent` with `children`; returns the page id.
    async fn create_page(
        &self,
        title: &str,
        parent: &ParentRef,
        children: &[Block],
    ) -> Result<String, NotionApiError>;

    /// Append `children` to the end of `page_id`.
    async fn append_children(&self, page_id: &str, children: &[Block]) -> Result<(), NotionApiError>;
}

/// Build the create-page request body.
pub fn create_page_body(title: &str, parent: &ParentRef, children: &[Block]) -> Value {
    json!({
        "parent": parent.to_json(),
        "properties": {
            "title": [{ "type": "text", "text": { "content": title } }]
        },
        "children": children,
    })
}

/// HTTP client for the Notion REST API.
#[derive(Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
    version: String,
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .finish()
    }
}

#[derive(Deserialize)]
struct CreatedPage {
    id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl NotionClient {
    pub fn new(
        token: impl Into<String>,
        base_url: impl Into<String>,
        version: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, NotionApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| NotionApiError::transport(e.to_string()))?;
        Ok(Self {
            http,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            version: version.into(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, NotionApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| NotionApiError::transport(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        Err(parse_error(status, &text))
    }
}

/// Turn a non-2xx Notion response into a [`NotionApiError`].
fn parse_error(status: u16, body: &str) -> NotionApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(e) => NotionApiError {
            status: Some(status),
            code: e.code,
            message: e.message.unwrap_or_else(|| body.to_string()),
        },
        Err(_) => NotionApiError {
            status: Some(status),
            code: None,
            message: body.to_string(),
        },
    }
}

#[async_trait]
impl DocumentApi for NotionClient {
    async fn create_page(
        &self,
        title: &str,
        parent: &ParentRef,
        children: &[Block],
    ) -> Result<String, NotionApiError> {
        debug!("POST /v1/pages with {} children", children.len());
        let body = create_page_body(title, parent, children);
        let response = self
            .send(self.request(reqwest::Method::POST, "/v1/pages").json(&body))
            .await?;
        let page: CreatedPage = response
            .json()
            .await
            .map_err(|e| NotionApiError::transport(format!("invalid create response: {e}")))?;
        Ok(page.id)
    }

    async fn append_children(&self, page_id: &str, children: &[Block]) -> Result<(), NotionApiError> {
        debug!("PATCH /v1/blocks/{}/children with {} children", page_id, children.len());
        let path = format!("/v1/blocks/{page_id}/children");
        let body = json!({ "children": children });
        self.send(self.request(reqwest::Method::PATCH, &path).json(&body))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_kind_parsing() {
        assert_eq!("database".parse::<ParentKind>().unwrap(), ParentKind::Database);
        assert_eq!(" Page ".parse::<ParentKind>().unwrap(), ParentKind::Page);
        assert!(matches!(
            "workspace".parse::<ParentKind>(),
            Err(Md2NotionError::InvalidParentType { .. })
        ));
    }

    #[test]
    fn default_titles() {
        assert_eq!(ParentKind::Database.default_title(), "Uploaded Markdown");
        assert_eq!(ParentKind::Page.default_title(), "Uploaded Markdown Page");
    }

    #[test]
    fn parent_json() {
        assert_eq!(ParentRef::database("db1").to_json(), json!({"database_id": "db1"}));
        assert_eq!(ParentRef::page("p1").to_json(), json!({"page_id": "p1"}));
    }

    #[test]
    fn create_body_shape() {
        let body = create_page_body(
            "Notes",
            &ParentRef::page("p1"),
            &[Block::Equation("x".into())],
        );
        assert_eq!(body["parent"]["page_id"], "p1");
        assert_eq!(body["properties"]["title"][0]["text"]["content"], "Notes");
        assert_eq!(body["children"][0]["equation"]["expression"], "x");
    }

    #[test]
    fn parse_notion_error_body() {
        let e = parse_error(
            400,
            r#"{"object":"error","status":400,"code":"validation_error","message":"bad"}"#,
        );
        assert_eq!(e.status, Some(400));
        assert_eq!(e.code.as_deref(), Some("validation_error"));
        assert_eq!(e.message, "bad");
    }

    #[test]
    fn parse_non_json_error_body() {
        let e = parse_error(502, "Bad Gateway");
        assert_eq!(e.code, None);
        assert_eq!(e.message, "Bad Gateway");
    }

    #[test]
    fn debug_redacts_token() {
        let c = NotionClient::new("secret_abc", NOTION_API_BASE, NOTION_VERSION, 5).unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret_abc"));
    }
}
