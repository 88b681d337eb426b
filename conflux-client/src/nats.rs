//! NATS JetStream backend
//!
//! Metadata records live in a JetStream key-value bucket, blobs in a
//! JetStream object store bucket. Both are opened from one connection.

use async_nats::jetstream::{self, kv, object_store};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use crate::{Backend, ClientError, Result};

/// How to authenticate against the NATS server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Unauthenticated connection attempt
    None,
    /// A `.creds` file holding a user JWT and NKey seed
    File(PathBuf),
    /// A user JWT and NKey seed supplied directly
    JwtSeed { jwt: String, seed: String },
}

impl Credentials {
    /// Picks credentials from optional run parameters
    ///
    /// Empty values count as absent. A credentials file wins over a JWT/seed
    /// pair. A JWT without a seed (or the reverse) is ignored.
    pub fn from_parts(
        creds_file: Option<PathBuf>,
        jwt: Option<String>,
        seed: Option<String>,
    ) -> Self {
        if let Some(path) = creds_file.filter(|path| !path.as_os_str().is_empty()) {
            return Self::File(path);
        }

        let jwt = jwt.filter(|jwt| !jwt.is_empty());
        let seed = seed.filter(|seed| !seed.is_empty());

        match (jwt, seed) {
            (Some(jwt), Some(seed)) => Self::JwtSeed { jwt, seed },
            (None, None) => Self::None,
            _ => {
                warn!("Both a JWT and a seed are required, connecting without credentials");
                Self::None
            }
        }
    }
}

/// Connection parameters for the backend
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub url: String,
    /// Connection name shown in server monitoring
    pub name: String,
    pub credentials: Credentials,
}

impl ConnectOptions {
    pub fn new(url: impl Into<String>, name: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            credentials,
        }
    }
}

/// Opens a NATS connection
pub async fn connect(options: &ConnectOptions) -> Result<async_nats::Client> {
    let connect_error = |message: String| ClientError::Connect {
        url: options.url.clone(),
        message,
    };

    let nats_options = match &options.credentials {
        Credentials::None => async_nats::ConnectOptions::new(),
        Credentials::File(path) => async_nats::ConnectOptions::with_credentials_file(path.clone())
            .await
            .map_err(|e| {
                connect_error(format!(
                    "unable to read credentials file {}: {}",
                    path.display(),
                    e
                ))
            })?,
        Credentials::JwtSeed { jwt, seed } => {
            async_nats::ConnectOptions::with_credentials(&credentials_document(jwt, seed))
                .map_err(|e| connect_error(format!("invalid JWT or seed: {}", e)))?
        }
    };

    let client = nats_options
        .name(options.name.clone())
        .connect(options.url.as_str())
        .await
        .map_err(|e| connect_error(e.to_string()))?;

    info!("Connected to {}", options.url);
    Ok(client)
}

/// Formats a JWT and seed the way `.creds` files are laid out
fn credentials_document(jwt: &str, seed: &str) -> String {
    format!(
        "-----BEGIN NATS USER JWT-----\n{jwt}\n------END NATS USER JWT------\n\n\
         -----BEGIN USER NKEY SEED-----\n{seed}\n------END USER NKEY SEED------\n"
    )
}

/// Backend reading from a JetStream key-value bucket and object store
pub struct NatsBackend {
    kv: kv::Store,
    objects: object_store::ObjectStore,
}

impl NatsBackend {
    /// Opens both buckets on an existing connection
    pub async fn open(client: async_nats::Client, kv_bucket: &str, object_bucket: &str) -> Result<Self> {
        let js = jetstream::new(client);

        let kv = js
            .get_key_value(kv_bucket)
            .await
            .map_err(|e| ClientError::Bucket {
                bucket: kv_bucket.to_string(),
                source: Box::new(e),
            })?;

        let objects = js
            .get_object_store(object_bucket)
            .await
            .map_err(|e| ClientError::Bucket {
                bucket: object_bucket.to_string(),
                source: Box::new(e),
            })?;

        info!(
            "Opened key-value bucket {} and object store {}",
            kv_bucket, object_bucket
        );

        Ok(Self { kv, objects })
    }
}

#[async_trait]
impl Backend for NatsBackend {
    async fn get_entry(&self, key: &str) -> Result<Vec<u8>> {
        let value = self
            .kv
            .get(key)
            .await
            .map_err(|e| ClientError::backend(key, e))?;

        value
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| ClientError::NotFound(key.to_string()))
    }

    async fn get_object(&self, path: &str) -> Result<Vec<u8>> {
        let mut object = self.objects.get(path).await.map_err(|e| {
            if matches!(e.kind(), object_store::GetErrorKind::NotFound) {
                ClientError::NotFound(path.to_string())
            } else {
                ClientError::backend(path, e)
            }
        })?;

        let mut content = Vec::new();
        object
            .read_to_end(&mut content)
            .await
            .map_err(|e| ClientError::backend(path, e))?;

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_file_wins() {
        let creds = Credentials::from_parts(
            Some(PathBuf::from("/etc/nats/user.creds")),
            Some("jwt".to_string()),
            Some("seed".to_string()),
        );
        assert_eq!(creds, Credentials::File(PathBuf::from("/etc/nats/user.creds")));
    }

    #[test]
    fn test_jwt_and_seed() {
        let creds = Credentials::from_parts(None, Some("jwt".to_string()), Some("seed".to_string()));
        assert_eq!(
            creds,
            Credentials::JwtSeed {
                jwt: "jwt".to_string(),
                seed: "seed".to_string()
            }
        );
    }

    #[test]
    fn test_incomplete_pair_is_unauthenticated() {
        assert_eq!(
            Credentials::from_parts(None, Some("jwt".to_string()), None),
            Credentials::None
        );
        assert_eq!(
            Credentials::from_parts(None, None, Some("seed".to_string())),
            Credentials::None
        );
        assert_eq!(Credentials::from_parts(None, None, None), Credentials::None);
    }

    #[test]
    fn test_empty_values_are_absent() {
        assert_eq!(
            Credentials::from_parts(Some(PathBuf::new()), None, None),
            Credentials::None
        );
        assert_eq!(
            Credentials::from_parts(
                Some(PathBuf::new()),
                Some("jwt".to_string()),
                Some("seed".to_string())
            ),
            Credentials::JwtSeed {
                jwt: "jwt".to_string(),
                seed: "seed".to_string()
            }
        );
        assert_eq!(
            Credentials::from_parts(None, Some(String::new()), Some(String::new())),
            Credentials::None
        );
    }

    #[test]
    fn test_credentials_document_layout() {
        let doc = credentials_document("eyJ0", "SUAB");
        assert!(doc.starts_with("-----BEGIN NATS USER JWT-----\neyJ0\n"));
        assert!(doc.contains("-----BEGIN USER NKEY SEED-----\nSUAB\n"));
    }
}
