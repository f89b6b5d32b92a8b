//! HTTP client for the table API.
//!
//! This module provides the `TableClient` struct for making authenticated
//! requests to the REST table interface: filtered reads and incident creates.
//!
//! # Failure handling
//!
//! No retry is performed. A read that does not return `200 OK`, or a create
//! that does not return `201 Created`, fails with
//! [`SnowcapError::RemoteRejection`] carrying status, headers and body.
//! Requests that never complete fail with [`SnowcapError::Transport`].
//!
//! # Security
//!
//! The password is never logged. Error text handed to callers through the
//! batch path is sanitized first.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::batch::{self, IncidentSubmitter};
use crate::config::Config;
use crate::error::SnowcapError;
use crate::models::{BatchReport, IncidentSpec, TableResponse};

/// Media type sent as both `Content-Type` and `Accept`.
const JSON_MEDIA_TYPE: &str = "application/json";

/// HTTP client for the table API.
///
/// Handles Basic authentication, header setup and status checking for
/// reads and incident creates.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let client = TableClient::new(&config)?;
///
/// let records = client.get_records("incident", Some("priority=1^active=true"), Some(5)).await?;
/// ```
#[derive(Clone)]
pub struct TableClient {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// Base URL of the table API, without trailing slash.
    base_url: String,

    /// URL incidents are POSTed to.
    incident_url: String,

    /// Basic-auth user name.
    username: String,

    /// Basic-auth password.
    /// SECURITY: Never log this value!
    password: Option<String>,

    /// Page size for reads that do not specify one.
    default_limit: u32,
}

impl TableClient {
    /// Creates a new table client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `SnowcapError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &Config) -> Result<Self, SnowcapError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(SnowcapError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            incident_url: config.incident_url.clone(),
            username: config.username.clone(),
            password: config.password().map(str::to_string),
            default_limit: config.default_limit,
        })
    }

    /// Returns the password (or "") for sanitization purposes.
    ///
    /// This should ONLY be used for sanitizing error messages, never for logging.
    pub(crate) fn password_for_sanitization(&self) -> &str {
        self.password.as_deref().unwrap_or("")
    }

    /// Validates a table name before it is interpolated into a URL path.
    ///
    /// # Errors
    ///
    /// Returns `SnowcapError::Validation` if the name is empty or contains
    /// characters that would change the URL structure.
    fn validate_table(table: &str) -> Result<(), SnowcapError> {
        let valid = !table.is_empty()
            && table
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_');
        if !valid {
            return Err(SnowcapError::validation(format!(
                "table name must be non-empty and contain only letters, digits or '_', got: {:?}",
                table.chars().take(50).collect::<String>()
            )));
        }
        Ok(())
    }

    fn table_url(&self, table: &str) -> Result<String, SnowcapError> {
        Self::validate_table(table)?;
        Ok(format!("{}/{}", self.base_url, table))
    }

    /// Tests connectivity to the instance.
    ///
    /// Reads a single incident to verify the server is reachable and the
    /// credentials are accepted.
    ///
    /// # Errors
    ///
    /// Returns `SnowcapError::Config` with a hint about what to check.
    pub async fn test_connection(&self) -> Result<(), SnowcapError> {
        tracing::debug!("Testing connection to table API");

        let result = self
            .query(RecordQuery::new(crate::config::INCIDENT_TABLE).with_limit(1))
            .await;

        match result {
            Ok(_) => {
                tracing::info!("Connection test successful");
                Ok(())
            }
            Err(SnowcapError::RemoteRejection { status, .. })
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                Err(SnowcapError::invalid_config(format!(
                    "authentication failed ({}) - verify SNOW_USERNAME and password",
                    status.as_u16()
                )))
            }
            Err(SnowcapError::Transport(e)) => {
                let message = SnowcapError::sanitize_message(
                    &e.to_string(),
                    self.password_for_sanitization(),
                );
                Err(SnowcapError::invalid_config(format!(
                    "could not reach server: {} - verify SNOW_BASE_URL is correct",
                    message
                )))
            }
            Err(e) => Err(SnowcapError::invalid_config(
                e.sanitized_display(self.password_for_sanitization()),
            )),
        }
    }

    /// Starts an authenticated request with the JSON headers set.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        tracing::debug!(method = %method, url = %url, "Making table API request");

        self.http
            .request(method, url)
            .basic_auth(&self.username, self.password.as_deref())
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(ACCEPT, JSON_MEDIA_TYPE)
    }

    /// Sends a request and returns the body text if the status is `expected`.
    ///
    /// Any other status becomes a `RemoteRejection`.
    async fn send_expecting(
        &self,
        req: RequestBuilder,
        expected: StatusCode,
    ) -> Result<String, SnowcapError> {
        let response = req.send().await.map_err(SnowcapError::Transport)?;
        let status = response.status();

        if status != expected {
            let headers = response.headers().clone();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to read rejection body");
                    String::new()
                }
            };
            tracing::debug!(status = %status, expected = %expected, "Unexpected status from table API");
            return Err(SnowcapError::RemoteRejection {
                status,
                headers,
                body,
            });
        }

        let body = response.text().await.map_err(SnowcapError::Transport)?;
        tracing::trace!(body = %body, "Table API response");
        Ok(body)
    }

    /// Fetches records from a table.
    ///
    /// Returns the decoded JSON body unmodified (normally `{"result": [...]}`).
    ///
    /// # Arguments
    ///
    /// * `table` - Table name (e.g. `incident`)
    /// * `query` - Optional `sysparm_query` filter; empty strings are ignored
    /// * `limit` - Maximum number of records; defaults to the configured page size
    ///
    /// # Example
    ///
    /// ```ignore
    /// let records = client
    ///     .get_records("incident", Some("priority=5^state=1"), Some(2))
    ///     .await?;
    /// println!("{}", serde_json::to_string_pretty(&records)?);
    /// ```
    pub async fn get_records(
        &self,
        table: &str,
        query: Option<&str>,
        limit: Option<u32>,
    ) -> Result<serde_json::Value, SnowcapError> {
        let mut params = RecordQuery::new(table);
        if let Some(filter) = query {
            params = params.with_filter(filter);
        }
        if let Some(limit) = limit {
            params = params.with_limit(limit);
        }
        self.query(params).await
    }

    /// Fetches records described by a [`RecordQuery`].
    ///
    /// # Errors
    ///
    /// - `Validation` if the table name is unusable
    /// - `RemoteRejection` for any status other than `200 OK`
    /// - `Transport` / `Decode` if the exchange or JSON decode fails
    pub async fn query(&self, params: RecordQuery) -> Result<serde_json::Value, SnowcapError> {
        self.fetch(&params).await
    }

    /// Fetches records and decodes the `result` envelope into `T`.
    ///
    /// ```ignore
    /// #[derive(serde::Deserialize)]
    /// struct Row { number: String }
    ///
    /// let rows = client
    ///     .get_records_as::<Vec<Row>>(RecordQuery::new("incident").with_fields(["number"]))
    ///     .await?
    ///     .into_result();
    /// ```
    pub async fn get_records_as<T>(
        &self,
        params: RecordQuery,
    ) -> Result<TableResponse<T>, SnowcapError>
    where
        T: DeserializeOwned,
    {
        self.fetch(&params).await
    }

    async fn fetch<T>(&self, params: &RecordQuery) -> Result<T, SnowcapError>
    where
        T: DeserializeOwned,
    {
        let url = self.table_url(&params.table)?;
        let query = params.to_query_pairs(self.default_limit);

        let req = self.request(Method::GET, &url).query(&query);
        let body = self.send_expecting(req, StatusCode::OK).await?;

        Ok(serde_json::from_str(&body)?)
    }

    /// Creates one incident.
    ///
    /// Returns the created record: the `result` object of the response when
    /// the body is wrapped in one, otherwise the whole decoded body.
    ///
    /// # Errors
    ///
    /// - `RemoteRejection` for any status other than `201 Created`
    /// - `Transport` if the exchange fails
    /// - `Decode` if the body is not JSON
    pub async fn create(&self, spec: &IncidentSpec) -> Result<serde_json::Value, SnowcapError> {
        let req = self.request(Method::POST, &self.incident_url).json(spec);
        let body = self.send_expecting(req, StatusCode::CREATED).await?;

        let response: serde_json::Value = serde_json::from_str(&body)?;
        Ok(unwrap_result(response))
    }

    /// Creates one incident from its three fields.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let record = client
    ///     .create_incident("Printer on fire", "<caller sys_id>", "<group sys_id>")
    ///     .await?;
    /// println!("Created {}", record["number"]);
    /// ```
    pub async fn create_incident(
        &self,
        short_description: &str,
        caller_id: &str,
        assignment_group: &str,
    ) -> Result<serde_json::Value, SnowcapError> {
        self.create(&IncidentSpec::new(short_description, caller_id, assignment_group))
            .await
    }

    /// Creates several incidents, one request at a time.
    ///
    /// Never fails as a whole: each item's result is recorded in the report.
    pub async fn create_multiple_incidents(&self, incidents: &[IncidentSpec]) -> BatchReport {
        batch::submit_batch(self, incidents).await
    }
}

impl fmt::Debug for TableClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableClient")
            .field("base_url", &self.base_url)
            .field("incident_url", &self.incident_url)
            .field("username", &self.username)
            .field("default_limit", &self.default_limit)
            .finish_non_exhaustive()
    }
}

/// Strips the `{"result": ...}` envelope if present.
fn unwrap_result(body: serde_json::Value) -> serde_json::Value {
    match body {
        serde_json::Value::Object(mut map) if map.contains_key("result") => {
            map.remove("result").unwrap_or(serde_json::Value::Null)
        }
        other => other,
    }
}

#[async_trait]
impl IncidentSubmitter for TableClient {
    async fn submit(&self, spec: &IncidentSpec) -> Result<serde_json::Value, SnowcapError> {
        self.create(spec).await
    }

    fn sanitize(&self, message: &str) -> String {
        SnowcapError::sanitize_message(message, self.password_for_sanitization())
    }
}

/// Parameters for reading records from a table.
///
/// Use the builder methods to narrow the read.
#[derive(Debug, Clone)]
pub struct RecordQuery {
    /// Table to read from.
    table: String,

    /// `sysparm_query` expression.
    filter: Option<String>,

    /// `sysparm_limit`; falls back to the client default.
    limit: Option<u32>,

    /// `sysparm_fields` projection.
    fields: Vec<String>,
}

impl RecordQuery {
    /// Reads from `table` with no filter and the default page size.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: None,
            limit: None,
            fields: Vec::new(),
        }
    }

    /// Sets the `sysparm_query` filter. Accepts a string or an
    /// [`EncodedQuery`](crate::models::EncodedQuery). Empty filters are dropped.
    pub fn with_filter(mut self, filter: impl fmt::Display) -> Self {
        let filter = filter.to_string();
        self.filter = if filter.is_empty() { None } else { Some(filter) };
        self
    }

    /// Sets the maximum number of records to return.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Restricts the returned columns.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Converts parameters to query-string pairs.
    fn to_query_pairs(&self, default_limit: u32) -> Vec<(&'static str, String)> {
        let mut pairs = vec![(
            "sysparm_limit",
            self.limit.unwrap_or(default_limit).to_string(),
        )];
        if let Some(ref filter) = self.filter {
            pairs.push(("sysparm_query", filter.clone()));
        }
        if !self.fields.is_empty() {
            pairs.push(("sysparm_fields", self.fields.join(",")));
        }
        pairs
    }
}
