//! Remote triple-store client.
//!
//! Speaks the RDF4J-style repository protocol GraphDB exposes:
//!
//! - `POST <server>/repositories/<repo>/statements` uploads a Turtle file
//! - `GET <server>/repositories/<repo>?query=...` runs the fixed select-all
//!   query and returns `application/sparql-results+json`
//! - `POST <server>/repositories/<repo>` with a form-encoded `query` runs an
//!   arbitrary SELECT or ASK query
//!
//! Requests are synchronous (`ureq`) with an agent-level timeout.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::export::TripleRow;
use crate::graph::sparql::SELECT_ALL;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Connection settings for the remote store (`[store]` in the config file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_repository")]
    pub repository: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_server() -> String {
    "http://localhost:7200".into()
}
fn default_repository() -> String {
    "letstalk".into()
}
fn default_username() -> String {
    "admin".into()
}
fn default_password() -> String {
    "root".into()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            repository: default_repository(),
            username: default_username(),
            password: default_password(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StoreConfig {
    /// SPARQL endpoint of the repository.
    pub fn repository_url(&self) -> String {
        format!(
            "{}/repositories/{}",
            self.server.trim_end_matches('/'),
            self.repository
        )
    }

    /// Statements endpoint of the repository.
    pub fn statements_url(&self) -> String {
        format!("{}/statements", self.repository_url())
    }

    fn authorization(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub path: String,
    pub bytes: usize,
}

/// One solution: `(variable, value)` pairs in projection order.
pub type BindingRow = Vec<(String, String)>;

#[derive(Debug, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    head: SparqlHead,
    results: Option<SparqlBindings>,
    boolean: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct SparqlHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    bindings: Vec<HashMap<String, SparqlValue>>,
}

#[derive(Debug, Deserialize)]
struct SparqlValue {
    value: String,
}

/// Client for one repository of a remote store.
pub struct TripleStoreClient {
    config: StoreConfig,
    agent: ureq::Agent,
}

impl TripleStoreClient {
    pub fn new(config: StoreConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self { config, agent }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Upload a Turtle file into the repository.
    ///
    /// The file must exist, be a regular file and be non-empty. Only a
    /// `204 No Content` answer counts as success.
    pub fn upload_file(&self, path: &Path) -> StoreResult<UploadReport> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(StoreError::FileNotFound { path: display });
        }
        if !path.is_file() {
            return Err(StoreError::NotAFile { path: display });
        }
        let body = std::fs::read(path).map_err(|e| StoreError::Read {
            path: display.clone(),
            source: e,
        })?;
        if body.is_empty() {
            return Err(StoreError::EmptyFile { path: display });
        }

        let url = self.config.statements_url();
        tracing::info!(path = %path.display(), bytes = body.len(), %url, "uploading turtle file");
        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "text/turtle")
            .set("Authorization", &self.config.authorization())
            .send_bytes(&body)
            .map_err(|e| self.request_error(e))?;

        if response.status() != 204 {
            let code = response.status();
            let body = response.into_string().unwrap_or_default();
            return Err(StoreError::Status { code, body });
        }
        Ok(UploadReport {
            path: display,
            bytes: body.len(),
        })
    }

    /// Fetch every `(s, p, o)` statement of the repository.
    pub fn select_all(&self) -> StoreResult<Vec<TripleRow>> {
        let url = self.config.repository_url();
        tracing::info!(%url, "querying all statements");
        let response = self
            .agent
            .get(&url)
            .query("query", SELECT_ALL)
            .set("Accept", "application/sparql-results+json")
            .set("Authorization", &self.config.authorization())
            .call()
            .map_err(|e| self.request_error(e))?;

        let results: SparqlResults =
            response
                .into_json()
                .map_err(|e| StoreError::MalformedResults {
                    message: e.to_string(),
                })?;
        let Some(solutions) = results.results else {
            return Err(StoreError::MalformedResults {
                message: "no `results` member in select-all answer".into(),
            });
        };

        let rows = solutions
            .bindings
            .into_iter()
            .map(|mut b| {
                let mut take = |var: &str| {
                    b.remove(var)
                        .map(|v| v.value)
                        .ok_or_else(|| StoreError::MalformedResults {
                            message: format!("binding without ?{var}"),
                        })
                };
                Ok(TripleRow {
                    subject: take("s")?,
                    predicate: take("p")?,
                    object: take("o")?,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        tracing::info!(rows = rows.len(), "fetched statements");
        Ok(rows)
    }

    /// Run a SELECT or ASK query against the repository.
    ///
    /// The query goes out form-encoded in a `POST` body. ASK answers come back
    /// as a single `result` binding.
    pub fn query(&self, sparql: &str) -> StoreResult<Vec<BindingRow>> {
        if sparql.trim().is_empty() {
            return Err(StoreError::EmptyQuery);
        }
        let url = self.config.repository_url();
        tracing::info!(%url, bytes = sparql.len(), "running SPARQL query");
        let response = self
            .agent
            .post(&url)
            .set("Accept", "application/sparql-results+json")
            .set("Authorization", &self.config.authorization())
            .send_form(&[("query", sparql)])
            .map_err(|e| self.request_error(e))?;

        let body = response.into_string().map_err(|e| StoreError::MalformedResults {
            message: e.to_string(),
        })?;
        let rows = parse_results(&body)?;
        tracing::info!(rows = rows.len(), "query answered");
        Ok(rows)
    }

    fn request_error(&self, err: ureq::Error) -> StoreError {
        match err {
            ureq::Error::Status(code, response) => StoreError::Status {
                code,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => StoreError::Transport {
                server: self.config.server.clone(),
                message: transport.to_string(),
            },
        }
    }
}

/// Decode a `application/sparql-results+json` document.
///
/// Each row lists the bound variables in `head.vars` order; unbound
/// variables are left out.
pub fn parse_results(json: &str) -> StoreResult<Vec<BindingRow>> {
    let results: SparqlResults =
        serde_json::from_str(json).map_err(|e| StoreError::MalformedResults {
            message: e.to_string(),
        })?;
    if let Some(answer) = results.boolean {
        return Ok(vec![vec![("result".to_string(), answer.to_string())]]);
    }
    let Some(solutions) = results.results else {
        return Err(StoreError::MalformedResults {
            message: "neither `results` nor `boolean` present".into(),
        });
    };
    let vars = results.head.vars;
    Ok(solutions
        .bindings
        .into_iter()
        .map(|mut binding| {
            let mut row: BindingRow = vars
                .iter()
                .filter_map(|var| binding.remove(var).map(|v| (var.clone(), v.value)))
                .collect();
            // Variables missing from the head, in a stable order.
            let mut rest: Vec<_> = binding.into_iter().map(|(k, v)| (k, v.value)).collect();
            rest.sort();
            row.extend(rest);
            row
        })
        .collect())
}

impl std::fmt::Debug for TripleStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripleStoreClient")
            .field("server", &self.config.server)
            .field("repository", &self.config.repository)
            .finish()
    }
}
