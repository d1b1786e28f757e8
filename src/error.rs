//! Rich diagnostic error types for the letstalk-kg pipeline.
//!
//! Each stage defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it. Identifier mapping, keyword extraction and
//! graph assembly have no error paths of their own.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the pipeline.
///
/// Each variant wraps a stage-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum KgError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("invalid IRI \"{iri}\": {message}")]
    #[diagnostic(
        code(letstalk::graph::invalid_iri),
        help(
            "Node identifiers must form absolute IRIs once joined to their namespace. \
             Check the namespace constants and the characters in the natural key."
        )
    )]
    InvalidIri { iri: String, message: String },

    #[error("SPARQL error: {message}")]
    #[diagnostic(
        code(letstalk::graph::sparql),
        help("The local oxigraph store rejected the operation. Check the query or the input Turtle.")
    )]
    Sparql { message: String },

    #[error("serialization failed: {message}")]
    #[diagnostic(
        code(letstalk::graph::serialize),
        help("Writing Turtle failed. Check free disk space and that the output is writable.")
    )]
    Serialize { message: String },

    #[error("I/O error on {path}")]
    #[diagnostic(
        code(letstalk::graph::io),
        help("Check that the path exists and you have read/write permissions.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Source data errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    #[error("source collection \"{collection}\" not found in {dir}")]
    #[diagnostic(
        code(letstalk::source::not_found),
        help(
            "Each collection is read from `<dir>/<collection>.jsonl` or `<dir>/<collection>.json`. \
             Export the trusted-zone table to one of those files."
        )
    )]
    NotFound { collection: String, dir: String },

    #[error("failed to read {path}")]
    #[diagnostic(
        code(letstalk::source::read),
        help("The collection file exists but could not be read. Check its permissions.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record in {path} at line {line}: {message}")]
    #[diagnostic(
        code(letstalk::source::malformed),
        help(
            "Records must be JSON objects with the collection's field names; \
             missing fields may be null or omitted, but present fields must have the right type."
        )
    )]
    Malformed {
        path: String,
        line: usize,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Triple-store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("file not found at {path}")]
    #[diagnostic(
        code(letstalk::store::file_not_found),
        help(
            "Generate it first (`letstalk-kg ontology` / `letstalk-kg build`), \
             or when running in a container verify the volume mount exists."
        )
    )]
    FileNotFound { path: String },

    #[error("path {path} is not a file")]
    #[diagnostic(code(letstalk::store::not_a_file), help("Point the upload at a Turtle file, not a directory."))]
    NotAFile { path: String },

    #[error("file {path} is empty")]
    #[diagnostic(
        code(letstalk::store::empty_file),
        help("An empty upload would be a no-op. Re-run the graph build and check its log.")
    )]
    EmptyFile { path: String },

    #[error("failed to read {path}")]
    #[diagnostic(code(letstalk::store::read), help("Check the file's permissions."))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("triple store answered {code}: {body}")]
    #[diagnostic(
        code(letstalk::store::status),
        help("The store rejected the request. The response body above usually names the cause (repository id, credentials, syntax).")
    )]
    Status { code: u16, body: String },

    #[error("could not reach triple store at {server}: {message}")]
    #[diagnostic(
        code(letstalk::store::transport),
        help(
            "Check the store is running and the port is mapped, e.g. \
             `curl -v {server}/rest/repositories`."
        )
    )]
    Transport { server: String, message: String },

    #[error("malformed SPARQL results: {message}")]
    #[diagnostic(
        code(letstalk::store::malformed_results),
        help("The store did not return an `application/sparql-results+json` document with the expected bindings.")
    )]
    MalformedResults { message: String },

    #[error("empty SPARQL query")]
    #[diagnostic(
        code(letstalk::store::empty_query),
        help("Pass the query text as an argument or with `--file <query.rq>`.")
    )]
    EmptyQuery,
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("I/O error on {path}")]
    #[diagnostic(
        code(letstalk::export::io),
        help("Check that the output directory is writable and the input table exists.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed triples table {path} at line {line}: expected 3 columns, got {columns}")]
    #[diagnostic(
        code(letstalk::export::malformed),
        help("The table must be tab-separated with subject, predicate and object columns.")
    )]
    Malformed {
        path: String,
        line: usize,
        columns: usize,
    },
}

// ---------------------------------------------------------------------------
// Analysis errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum AnalysisError {
    #[error("model artifact not found: {path}")]
    #[diagnostic(
        code(letstalk::analysis::not_found),
        help("The model directory must contain entity_embeddings.tsv.gz and training_triples/*.tsv.gz.")
    )]
    NotFound { path: String },

    #[error("failed to read {path}")]
    #[diagnostic(code(letstalk::analysis::read), help("Check the file's permissions and gzip integrity."))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact {path}: {message}")]
    #[diagnostic(
        code(letstalk::analysis::malformed),
        help("Re-export the trained model; every table must be non-empty and rectangular.")
    )]
    Malformed { path: String, message: String },

    #[error("not enough entities to cluster: found {found}, need at least {needed}")]
    #[diagnostic(
        code(letstalk::analysis::too_few),
        help("Generate more users, or check that users are typed as dbo:User in the triples table.")
    )]
    TooFewEntities { found: usize, needed: usize },

    #[error("invalid clustering parameter: {message}")]
    #[diagnostic(code(letstalk::analysis::invalid_parameter), help("{message}"))]
    InvalidParameter { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(letstalk::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(letstalk::config::parse),
        help("Check the TOML syntax and the field names under [source], [graph], [store], [analysis].")
    )]
    Parse { path: String, message: String },

    #[error("failed to serialize config for {path}: {message}")]
    #[diagnostic(
        code(letstalk::config::serialize),
        help("A config value could not be rendered as TOML. Check for values TOML cannot represent.")
    )]
    Serialize { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(letstalk::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(letstalk::config::invalid), help("{message}"))]
    Invalid { message: String },
}

/// Convenience alias for functions returning pipeline results.
pub type KgResult<T> = std::result::Result<T, KgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts_to_kg_error() {
        let err = StoreError::Status {
            code: 400,
            body: "bad".into(),
        };
        let kg: KgError = err.into();
        assert!(matches!(kg, KgError::Store(StoreError::Status { code: 400, .. })));
    }

    #[test]
    fn analysis_error_wraps_export_error() {
        let export = ExportError::Malformed {
            path: "t.tsv".into(),
            line: 3,
            columns: 2,
        };
        let analysis: AnalysisError = export.into();
        assert!(matches!(analysis, AnalysisError::Export(ExportError::Malformed { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = StoreError::Status {
            code: 401,
            body: "Unauthorized".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("401"));
        assert!(msg.contains("Unauthorized"));
    }
}
