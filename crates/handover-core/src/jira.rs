use crate::config::JiraConfig;
use crate::error::{HandoverError, Result};
use crate::store::FetchedTicket;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const SERVICE: &str = "jira";
const SEARCH_PATH: &str = "rest/api/3/search/jql";
const MYSELF_PATH: &str = "rest/api/3/myself";
const SEARCH_FIELDS: &str = "summary,status,key";
const NO_SUMMARY: &str = "No summary";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    fields: Option<IssueFields>,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Myself {
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking Jira REST client authenticated with email + API token.
#[derive(Clone)]
pub struct JiraClient {
    config: JiraConfig,
    client: Client,
}

impl JiraClient {
    pub fn new(config: JiraConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                HandoverError::InvalidConfig(format!("failed to build Jira HTTP client: {e}"))
            })?;
        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.endpoint(path))
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn request_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .map_err(|e| HandoverError::transport(SERVICE, e))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| HandoverError::transport(SERVICE, e))?;
        if !status.is_success() {
            return Err(HandoverError::UpstreamStatus {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| HandoverError::malformed(SERVICE, e))
    }

    /// Run the configured JQL query and return up to `max_results` tickets in
    /// the order Jira returned them.
    pub fn search(&self) -> Result<Vec<FetchedTicket>> {
        let max_results = self.config.max_results.to_string();
        let request = self.get(SEARCH_PATH).query(&[
            ("jql", self.config.jql.as_str()),
            ("maxResults", max_results.as_str()),
            ("fields", SEARCH_FIELDS),
        ]);
        let response: SearchResponse = self.request_json(request)?;

        let tickets: Vec<FetchedTicket> = response
            .issues
            .into_iter()
            .filter_map(|issue| {
                let key = issue.key.filter(|k| !k.trim().is_empty())?;
                let summary = issue
                    .fields
                    .and_then(|f| f.summary)
                    .unwrap_or_else(|| NO_SUMMARY.to_string());
                Some(FetchedTicket { key, summary })
            })
            .collect();
        tracing::debug!(count = tickets.len(), "fetched tickets from jira");
        Ok(tickets)
    }

    /// Display name of the authenticated user.
    pub fn myself(&self) -> Result<String> {
        let me: Myself = self.request_json(self.get(MYSELF_PATH))?;
        Ok(me.display_name.unwrap_or_else(|| self.config.email.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
