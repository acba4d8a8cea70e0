//! Blocking HTTP transport for the Anytype local API.
//!
//! [`ApiClient`] sends one request per call: no retries, no caching. It checks
//! the `Anytype-Version` header on every response, turns non-success statuses
//! into [`AnytypeError::Api`], and unwraps the API's response envelopes.

use crate::{AnytypeError, NewTag, Result, Tag, TagStore};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// Where the desktop app serves its API by default.
pub const DEFAULT_API_URL: &str = "http://localhost:31009/v1";

/// Name this client registers under during pairing, unless configured otherwise.
pub const DEFAULT_APP_NAME: &str = "RustClient";

/// Response header carrying the API version date.
pub const VERSION_HEADER: &str = "Anytype-Version";

/// Oldest API version this client speaks.
pub const MIN_API_VERSION: &str = "2025-04-22";

/// Offset/limit window for list calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { offset: 0, limit: 100 }
    }
}

/// Pagination block of list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub has_more: bool,
}

/// A list response: one page of records plus pagination.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> ListResponse<T> {
    /// Whether another page may follow a page requested with `page`.
    fn has_more(&self, page: Page) -> bool {
        match &self.pagination {
            Some(p) => p.has_more && !self.data.is_empty(),
            None => self.data.len() >= page.limit && page.limit > 0,
        }
    }
}

/// Walks pages from offset 0 until the API reports no more.
pub(crate) fn collect_pages<T>(
    limit: usize,
    mut fetch: impl FnMut(Page) -> Result<ListResponse<T>>,
) -> Result<Vec<T>> {
    let mut page = Page::new(0, limit);
    let mut all = Vec::new();
    loop {
        let response = fetch(page)?;
        let more = response.has_more(page);
        let fetched = response.data.len();
        all.extend(response.data);
        if !more {
            return Ok(all);
        }
        page.offset += fetched;
    }
}

/// Rejects responses from apps older than [`MIN_API_VERSION`].
///
/// # Errors
///
/// [`AnytypeError::MissingVersionHeader`] without a header, and
/// [`AnytypeError::UnsupportedVersion`] for an older or unparseable date.
pub(crate) fn check_version(header: Option<&str>) -> Result<()> {
    let raw = header.ok_or(AnytypeError::MissingVersionHeader)?;
    let unsupported = || AnytypeError::UnsupportedVersion {
        found: raw.to_string(),
        required: MIN_API_VERSION.to_string(),
    };
    let found = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| unsupported())?;
    let required = NaiveDate::parse_from_str(MIN_API_VERSION, "%Y-%m-%d").map_err(|_| unsupported())?;
    if found < required {
        return Err(unsupported());
    }
    Ok(())
}

/// The `message` of an error body, or the raw body when it has none.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Takes the record out of a `{"<field>": {...}}` envelope.
pub(crate) fn unwrap_envelope<T: DeserializeOwned>(mut body: Value, field: &str) -> Result<T> {
    let inner = body
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| AnytypeError::InvalidResponse(format!("missing '{field}' in response")))?;
    Ok(serde_json::from_value(inner)?)
}

/// Blocking client for the local API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    app_name: String,
    app_key: Option<String>,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. [`DEFAULT_API_URL`]).
    ///
    /// # Errors
    ///
    /// Returns [`AnytypeError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, app_name: &str) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_name: app_name.to_string(),
            app_key: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn app_key(&self) -> Option<&str> {
        self.app_key.as_deref()
    }

    pub fn set_app_key(&mut self, app_key: Option<String>) {
        self.app_key = app_key;
    }

    /// Sends one request and returns the decoded JSON body.
    ///
    /// # Errors
    ///
    /// Transport failures, version-header failures, non-success statuses and
    /// undecodable bodies, in that order of checking.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("{method} {url}");

        let mut builder = self.http.request(method, url.as_str()).query(query);
        if let Some(key) = &self.app_key {
            builder = builder.bearer_auth(key);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let version = response
            .headers()
            .get(VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        check_version(version.as_deref())?;

        let text = response.text()?;
        if !status.is_success() {
            return Err(AnytypeError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    pub(crate) fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, &[], None)
    }

    pub(crate) fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, &[], None)
    }

    pub(crate) fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, &[], Some(body))
    }

    pub(crate) fn patch(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PATCH, path, &[], Some(body))
    }

    /// Fetches one record from a `{"<field>": ...}` envelope.
    pub(crate) fn get_record<T: DeserializeOwned>(&self, path: &str, field: &str) -> Result<T> {
        unwrap_envelope(self.get(path)?, field)
    }

    /// Fetches one page of a list endpoint.
    pub(crate) fn list<T: DeserializeOwned>(&self, path: &str, page: Page) -> Result<ListResponse<T>> {
        let body = self.request(Method::GET, path, &page.query(), None)?;
        Ok(serde_json::from_value(body)?)
    }

    /// Fetches every page of a list endpoint.
    pub(crate) fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        collect_pages(Page::default().limit, |page| self.list(path, page))
    }

    /// Starts pairing: the app shows a 4-digit code and this returns the challenge id.
    ///
    /// # Errors
    ///
    /// Any transport error, or [`AnytypeError::InvalidResponse`] without a challenge id.
    pub fn display_code(&self) -> Result<String> {
        let body = self.request(
            Method::POST,
            "/auth/display_code",
            &[("app_name", self.app_name.clone())],
            None,
        )?;
        string_field(&body, "challenge_id")
    }

    /// Completes pairing, exchanging the challenge id and code for an app key.
    ///
    /// # Errors
    ///
    /// Any transport error, or [`AnytypeError::InvalidResponse`] without an app key.
    pub fn get_token(&self, challenge_id: &str, code: &str) -> Result<String> {
        let body = self.request(
            Method::POST,
            "/auth/token",
            &[
                ("challenge_id", challenge_id.to_string()),
                ("code", code.to_string()),
            ],
            None,
        )?;
        string_field(&body, "app_key")
    }

    /// Runs a search at `path`, either global (`/search`) or space-scoped.
    pub(crate) fn search(&self, path: &str, query: &str, types: &[String], page: Page) -> Result<ListResponse<Value>> {
        let body = json!({ "query": query, "types": types });
        let response = self.request(Method::POST, path, &page.query(), Some(&body))?;
        Ok(serde_json::from_value(response)?)
    }
}

pub(crate) fn string_field(body: &Value, field: &str) -> Result<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AnytypeError::InvalidResponse(format!("missing '{field}' in response")))
}

impl TagStore for ApiClient {
    fn list_tags(&self, space_id: &str, property_id: &str) -> Result<Vec<Tag>> {
        self.list_all(&format!("/spaces/{space_id}/properties/{property_id}/tags"))
    }

    fn create_tag(&self, space_id: &str, property_id: &str, tag: &NewTag) -> Result<Tag> {
        let body = self.post(
            &format!("/spaces/{space_id}/properties/{property_id}/tags"),
            &serde_json::to_value(tag)?,
        )?;
        unwrap_envelope(body, "tag")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_header_checks() {
        assert!(matches!(check_version(None), Err(AnytypeError::MissingVersionHeader)));
        assert!(matches!(
            check_version(Some("2025-03-17")),
            Err(AnytypeError::UnsupportedVersion { .. })
        ));
        assert!(matches!(
            check_version(Some("not-a-date")),
            Err(AnytypeError::UnsupportedVersion { .. })
        ));
        assert!(check_version(Some("2025-04-22")).is_ok());
        assert!(check_version(Some("2025-11-08")).is_ok());
    }

    #[test]
    fn test_error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"object":"error","status":404,"message":"object not found"}"#),
            "object not found"
        );
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn test_unwrap_envelope() {
        let body = serde_json::json!({"tag": {"id": "t1", "name": "Fiction", "color": "red"}});
        let tag: Tag = unwrap_envelope(body, "tag").unwrap();
        assert_eq!(tag.id, "t1");

        let err = unwrap_envelope::<Tag>(serde_json::json!({}), "tag").unwrap_err();
        assert!(matches!(err, AnytypeError::InvalidResponse(_)));
    }

    #[test]
    fn test_collect_pages_follows_has_more() {
        let mut seen = Vec::new();
        let all = collect_pages(2, |page| {
            seen.push(page.offset);
            let data: Vec<u32> = match page.offset {
                0 => vec![1, 2],
                2 => vec![3, 4],
                _ => vec![5],
            };
            Ok(ListResponse {
                pagination: Some(Pagination {
                    total: 5,
                    offset: page.offset,
                    limit: 2,
                    has_more: page.offset + data.len() < 5,
                }),
                data,
            })
        })
        .unwrap();
        assert_eq!(all, vec![1, 2, 3, 4, 5]);
        assert_eq!(seen, vec![0, 2, 4]);
    }

    #[test]
    fn test_collect_pages_without_pagination_stops_on_short_page() {
        let all = collect_pages(3, |page| {
            let data: Vec<u32> = if page.offset == 0 { vec![1, 2, 3] } else { vec![4] };
            Ok(ListResponse { data, pagination: None })
        })
        .unwrap();
        assert_eq!(all, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_list_response_tolerates_missing_data() {
        let parsed: ListResponse<Tag> = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.data.is_empty());
        assert!(parsed.pagination.is_none());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:31009/v1/", DEFAULT_APP_NAME).unwrap();
        assert_eq!(client.base_url(), DEFAULT_API_URL);
        assert!(client.app_key().is_none());
    }
}
