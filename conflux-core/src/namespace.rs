//! Namespace layout
//!
//! Metadata keys are dot separated (`ns.pipeline.orders.version.1.0.0`).
//! The blob directory of a version is the same path with every `.` turned
//! into `/`, so either one can be derived from the other.
//!
//! Content and artifact paths are joined differently: content lives directly
//! under the blob root (`{root}/{content}`), artifacts are appended with the
//! namespace separator (`{root}.{artifact}`). Blob lookups always go through
//! [`normalize_blob_path`], which only adds the leading `/`.

/// Separator between metadata key segments
pub const NAMESPACE_SEPARATOR: char = '.';

/// Separator between blob path segments
pub const PATH_SEPARATOR: char = '/';

/// Key and path builder bound to one namespace prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    /// Creates a namespace rooted at `prefix`
    ///
    /// An empty prefix roots keys directly at `pipeline.`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Metadata key of a pipeline identity: `{prefix}.pipeline.{key}`
    pub fn pipeline_path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            format!("pipeline{NAMESPACE_SEPARATOR}{key}")
        } else {
            format!(
                "{}{NAMESPACE_SEPARATOR}pipeline{NAMESPACE_SEPARATOR}{key}",
                self.prefix
            )
        }
    }

    /// Metadata key of a version record: `{pipeline_path}.version.{version}`
    pub fn version_path(&self, key: &str, version: &str) -> String {
        format!(
            "{}{NAMESPACE_SEPARATOR}version{NAMESPACE_SEPARATOR}{version}",
            self.pipeline_path(key)
        )
    }
}

/// Blob directory of a version, derived from its metadata key
pub fn blob_root(version_path: &str) -> String {
    version_path.replace(NAMESPACE_SEPARATOR, "/")
}

/// Blob path of the pipeline definition
pub fn content_path(blob_root: &str, content_key: &str) -> String {
    format!(
        "{blob_root}{PATH_SEPARATOR}{}",
        content_key.trim_start_matches(PATH_SEPARATOR)
    )
}

/// Blob path of a supporting artifact
pub fn artifact_path(blob_root: &str, artifact_key: &str) -> String {
    format!("{blob_root}{NAMESPACE_SEPARATOR}{artifact_key}")
}

/// Ensures a blob path starts with `/`
pub fn normalize_blob_path(path: &str) -> String {
    if path.starts_with(PATH_SEPARATOR) {
        path.to_string()
    } else {
        format!("{PATH_SEPARATOR}{path}")
    }
}
