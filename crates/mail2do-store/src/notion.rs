//! Notion API client
//!
//! Talks to the Notion REST API with an async `reqwest` client driven on a
//! client-owned current-thread runtime, so the store traits stay blocking.
//!
//! # Examples
//!
//! ```no_run
//! use mail2do_store::{NotionClient, NotionConfig};
//! use mail2do_domain::traits::TaskStore;
//!
//! let client = NotionClient::new("secret_token", NotionConfig::new("db1")).unwrap();
//! let exists = client.title_exists("Task name", "Call plumber").unwrap();
//! ```

use crate::encode::page_body;
use crate::schema::DatabaseSource;
use crate::StoreError;
use mail2do_domain::traits::TaskStore;
use mail2do_domain::{PageRecord, StoreUser};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// Default `Notion-Version` header
pub const DEFAULT_API_VERSION: &str = "2022-06-28";

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default cap on rows scanned for reference values
pub const DEFAULT_MAX_REFERENCE_ROWS: usize = 10_000;

/// Settings for the Notion client (the token is passed separately)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Destination database id
    pub database_id: String,

    /// `Notion-Version` header value
    pub api_version: String,

    /// API base URL
    pub base_url: String,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Maximum rows read when collecting reference values
    pub max_reference_rows: usize,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            database_id: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_reference_rows: DEFAULT_MAX_REFERENCE_ROWS,
        }
    }
}

impl NotionConfig {
    /// Default settings for one database
    pub fn new(database_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            ..Self::default()
        }
    }
}

/// Blocking Notion client implementing [`TaskStore`] and [`DatabaseSource`]
pub struct NotionClient {
    token: String,
    config: NotionConfig,
    client: reqwest::Client,
    runtime: Runtime,
}

#[derive(Deserialize)]
struct UserPage {
    #[serde(default)]
    results: Vec<RawUser>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct RawUser {
    id: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    name: Option<String>,
    person: Option<RawPerson>,
}

#[derive(Deserialize)]
struct RawPerson {
    email: Option<String>,
}

impl NotionClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the token is empty or the HTTP client
    /// or runtime cannot be built.
    pub fn new(token: impl Into<String>, config: NotionConfig) -> Result<Self, StoreError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(StoreError::Config("Notion token is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            token,
            config,
            client,
            runtime,
        })
    }

    /// Destination database id
    pub fn database_id(&self) -> &str {
        &self.config.database_id
    }

    /// Client settings
    pub fn config(&self) -> &NotionConfig {
        &self.config
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value, StoreError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);

        let mut builder = self
            .client
            .request(method, &url)
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.config.api_version)
            .header("Content-Type", "application/json");
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Notion puts a human-readable reason in `message`
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(text);
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn block_on_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value, StoreError> {
        self.runtime
            .block_on(self.request(method, path, query, body))
    }
}

impl DatabaseSource for NotionClient {
    fn fetch_database(&self, database_id: &str) -> Result<Value, StoreError> {
        debug!("Fetching database {}", database_id);
        match self.block_on_request(Method::GET, &format!("databases/{}", database_id), &[], None)
        {
            Err(StoreError::Api { status, .. }) if status == 404 || status == 403 => {
                Err(StoreError::NotFound(database_id.to_string()))
            }
            other => other,
        }
    }

    fn query_database(&self, database_id: &str, body: &Value) -> Result<Value, StoreError> {
        self.block_on_request(
            Method::POST,
            &format!("databases/{}/query", database_id),
            &[],
            Some(body),
        )
    }
}

impl TaskStore for NotionClient {
    type Error = StoreError;

    fn title_exists(&self, title_field: &str, title: &str) -> Result<bool, Self::Error> {
        let body = json!({
            "filter": { "property": title_field, "title": { "equals": title } },
            "page_size": 1,
        });
        let reply = self.query_database(&self.config.database_id, &body)?;
        let found = reply
            .get("results")
            .and_then(Value::as_array)
            .is_some_and(|r| !r.is_empty());
        debug!("Title {:?} exists: {}", title, found);
        Ok(found)
    }

    fn create_page(&mut self, record: &PageRecord) -> Result<String, Self::Error> {
        let body = page_body(&self.config.database_id, record);
        let reply = self.block_on_request(Method::POST, "pages", &[], Some(&body))?;
        reply
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::InvalidData("Created page has no id".to_string()))
    }

    fn list_users(&self) -> Result<Vec<StoreUser>, Self::Error> {
        let mut users = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("page_size", "100")];
            if let Some(c) = cursor.as_deref() {
                query.push(("start_cursor", c));
            }
            let reply = self.block_on_request(Method::GET, "users", &query, None)?;
            let page: UserPage = serde_json::from_value(reply)?;

            users.extend(
                page.results
                    .into_iter()
                    .filter(|u| u.kind.as_deref() == Some("person"))
                    .map(|u| StoreUser {
                        id: u.id,
                        name: u.name,
                        email: u.person.and_then(|p| p.email),
                    }),
            );

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        info!("Listed {} workspace users", users.len());
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mail2do_domain::PropertyValue;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> NotionClient {
        let config = NotionConfig {
            base_url: server.url(),
            ..NotionConfig::new("db1")
        };
        NotionClient::new("secret", config).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = NotionConfig::default();
        assert_eq!(config.api_version, "2022-06-28");
        assert_eq!(config.max_reference_rows, 10_000);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = NotionClient::new("", NotionConfig::new("db1"));
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[test]
    fn test_title_exists_sends_exact_filter() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/databases/db1/query")
            .match_header("authorization", "Bearer secret")
            .match_header("notion-version", "2022-06-28")
            .match_body(Matcher::Json(json!({
                "filter": {"property": "Task name", "title": {"equals": "Add Alice's on-call dates"}},
                "page_size": 1
            })))
            .with_status(200)
            .with_body(r#"{"results": [{"id": "p1"}]}"#)
            .create();

        let client = client_for(&server);
        assert!(client
            .title_exists("Task name", "Add Alice's on-call dates")
            .unwrap());
        mock.assert();
    }

    #[test]
    fn test_title_absent_when_results_empty() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/databases/db1/query")
            .with_status(200)
            .with_body(r#"{"results": []}"#)
            .create();

        let client = client_for(&server);
        assert!(!client.title_exists("Task name", "New task").unwrap());
    }

    #[test]
    fn test_create_page_returns_id() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/pages")
            .match_body(Matcher::PartialJson(json!({
                "parent": {"database_id": "db1"},
                "properties": {"Task name": {"title": [{"type": "text", "text": {"content": "Call plumber"}}]}}
            })))
            .with_status(200)
            .with_body(r#"{"id": "page-42"}"#)
            .create();

        let mut client = client_for(&server);
        let mut record = PageRecord::new();
        record.push("Task name", PropertyValue::Title("Call plumber".to_string()));

        assert_eq!(client.create_page(&record).unwrap(), "page-42");
        mock.assert();
    }

    #[test]
    fn test_api_error_message_is_surfaced() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/pages")
            .with_status(400)
            .with_body(r#"{"object": "error", "message": "Priority is not a property that exists."}"#)
            .create();

        let mut client = client_for(&server);
        let err = client.create_page(&PageRecord::new()).unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 400, .. }));
        assert_eq!(err.to_string(), "Priority is not a property that exists.");
    }

    #[test]
    fn test_list_users_paginates_and_keeps_people() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/users")
            .match_query(Matcher::Regex("^page_size=100$".into()))
            .with_status(200)
            .with_body(
                r#"{"results": [
                    {"id": "u1", "type": "person", "name": "Alice", "person": {"email": "alice@example.com"}},
                    {"id": "b1", "type": "bot", "name": "Integration", "bot": {}}
                ], "has_more": true, "next_cursor": "c2"}"#,
            )
            .create();
        server
            .mock("GET", "/users")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page_size".into(), "100".into()),
                Matcher::UrlEncoded("start_cursor".into(), "c2".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"results": [{"id": "u2", "type": "person", "name": "Bob", "person": {}}], "has_more": false, "next_cursor": null}"#)
            .create();

        let client = client_for(&server);
        let users = client.list_users().unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email.as_deref(), Some("alice@example.com"));
        assert_eq!(users[1].name.as_deref(), Some("Bob"));
        assert_eq!(users[1].email, None);
    }

    #[test]
    fn test_unshared_database_is_not_found() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/databases/other")
            .with_status(404)
            .with_body(r#"{"object": "error", "message": "Could not find database"}"#)
            .create();

        let client = client_for(&server);
        let result = client.fetch_database("other");
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "other"));
    }
}
