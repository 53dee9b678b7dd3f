//! Blocking Jira REST client implementing the `TicketApi` seam.
//!
//! Thin collaborator: fetch, cancel (via workflow transition), comment.
//! Scoring logic never lives here.

use chrono::{DateTime, Utc};
use quell_core::errors::{ApiError, ConfigError};
use quell_core::traits::TicketApi;
use quell_core::types::{StatusCategory, Ticket};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Transition names tried, in order, when cancelling a ticket.
const PREFERRED_TRANSITIONS: &[&str] = &["done", "duplicate", "close", "cancel", "resolve"];

pub struct JiraClient {
    http: reqwest::blocking::Client,
    base_url: String,
    email: String,
    token: String,
    max_results: u32,
}

impl JiraClient {
    /// Build a client from `QUELL_JIRA_SITE`, `QUELL_JIRA_EMAIL`, and
    /// `QUELL_JIRA_TOKEN`.
    pub fn from_env(max_results: u32) -> Result<Self, ConfigError> {
        let site = require_env("QUELL_JIRA_SITE")?;
        let email = require_env("QUELL_JIRA_EMAIL")?;
        let token = require_env("QUELL_JIRA_TOKEN")?;
        Ok(Self {
            http: reqwest::blocking::Client::new(),
            base_url: format!("https://{site}.atlassian.net"),
            email,
            token,
            max_results,
        })
    }

    fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, endpoint))
            .basic_auth(&self.email, Some(&self.token))
            .query(query)
            .send()
            .map_err(|e| ApiError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }
        response.json().map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    fn post(&self, endpoint: &str, body: &Value) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoint))
            .basic_auth(&self.email, Some(&self.token))
            .json(body)
            .send()
            .map_err(|e| ApiError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }
        Ok(())
    }
}

impl TicketApi for JiraClient {
    fn search(
        &self,
        projects: &[String],
        created_since: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, ApiError> {
        let jql = build_jql(projects, created_since);
        debug!(%jql, "searching tickets");

        let body = self.get(
            "/rest/api/3/search/jql",
            &[
                ("jql", jql),
                ("maxResults", self.max_results.to_string()),
                (
                    "fields",
                    "summary,created,status,reporter,description".to_string(),
                ),
            ],
        )?;

        let issues = body
            .get("issues")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::Decode {
                endpoint: "/rest/api/3/search/jql".to_string(),
                message: "missing issues array".to_string(),
            })?;

        // Malformed tickets are skipped, never crash the run.
        let mut tickets = Vec::with_capacity(issues.len());
        for issue in issues {
            match decode_issue(issue) {
                Some(ticket) => tickets.push(ticket),
                None => {
                    let key = issue.get("key").and_then(|v| v.as_str()).unwrap_or("?");
                    warn!(key, "skipping malformed ticket");
                }
            }
        }
        Ok(tickets)
    }

    fn cancel(&self, ticket_id: &str) -> Result<(), ApiError> {
        let endpoint = format!("/rest/api/3/issue/{ticket_id}/transitions");
        let body = self.get(&endpoint, &[])?;
        let transitions = body
            .get("transitions")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::Decode {
                endpoint: endpoint.clone(),
                message: "missing transitions array".to_string(),
            })?;

        let transition_id = pick_transition(transitions).ok_or_else(|| {
            ApiError::NoCancelTransition {
                ticket_id: ticket_id.to_string(),
            }
        })?;

        self.post(&endpoint, &json!({ "transition": { "id": transition_id } }))
    }

    fn comment(&self, ticket_id: &str, text: &str) -> Result<(), ApiError> {
        let endpoint = format!("/rest/api/3/issue/{ticket_id}/comment");
        let body = json!({
            "body": {
                "type": "doc",
                "version": 1,
                "content": [{
                    "type": "paragraph",
                    "content": [{ "type": "text", "text": text }]
                }]
            }
        });
        self.post(&endpoint, &body)
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingCredential {
            name: name.to_string(),
        }),
    }
}

fn build_jql(projects: &[String], created_since: DateTime<Utc>) -> String {
    format!(
        "project in ({}) AND created >= \"{}\" ORDER BY created ASC",
        projects.join(", "),
        created_since.format("%Y-%m-%d %H:%M")
    )
}

/// Decode one issue. `None` when a required field (key, summary, created)
/// is missing or unparseable.
fn decode_issue(issue: &Value) -> Option<Ticket> {
    let id = issue.get("key")?.as_str()?.to_string();
    let fields = issue.get("fields")?;

    let subject = fields.get("summary")?.as_str()?.to_string();
    let created = parse_created(fields.get("created")?.as_str()?)?;

    let status_name = fields
        .pointer("/status/name")
        .and_then(Value::as_str)
        .unwrap_or("");
    let category_key = fields
        .pointer("/status/statusCategory/key")
        .and_then(Value::as_str)
        .unwrap_or("");

    let reporter = fields
        .pointer("/reporter/displayName")
        .or_else(|| fields.pointer("/reporter/accountId"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let description = fields
        .get("description")
        .map(adf_text)
        .unwrap_or_default();

    Some(Ticket {
        id,
        subject,
        description,
        created,
        reporter,
        status: status_category(status_name, category_key),
    })
}

/// Jira emits `2025-06-02T09:00:00.000+0000`; chrono's RFC 3339 parser wants
/// a colon in the offset, so fall back to an explicit format.
fn parse_created(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn status_category(name: &str, category_key: &str) -> StatusCategory {
    let name = name.to_lowercase();
    if name.contains("cancel") || name.contains("duplicate") {
        return StatusCategory::Cancelled;
    }
    match category_key {
        "done" => StatusCategory::Done,
        "indeterminate" => StatusCategory::InProgress,
        _ => StatusCategory::Todo,
    }
}

fn pick_transition(transitions: &[Value]) -> Option<String> {
    for preferred in PREFERRED_TRANSITIONS {
        for transition in transitions {
            let name = transition
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_lowercase();
            if name.contains(preferred) {
                return transition
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
        }
    }
    None
}

/// Flatten an Atlassian Document Format value (or plain string) to text.
fn adf_text(value: &Value) -> String {
    fn walk(value: &Value, out: &mut String) {
        match value {
            Value::String(s) => {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(s);
            }
            Value::Object(map) => {
                if let Some(Value::String(text)) = map.get("text") {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(text);
                }
                if let Some(content) = map.get("content") {
                    walk(content, out);
                }
            }
            Value::Array(items) => {
                for item in items {
                    walk(item, out);
                }
            }
            _ => {}
        }
    }

    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => {
            let mut out = String::new();
            walk(other, &mut out);
            out
        }
    }
}
