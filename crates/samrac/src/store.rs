use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Object key holding the last notified day.
pub const DEFAULT_MARKER_KEY: &str = "last_good_month_day";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Durable home of the "last notified day" marker.
#[async_trait]
pub trait MarkerStore: Send + Sync {
    /// Read the current marker. A missing key is `Ok(None)`, not an error.
    async fn read_marker(&self) -> Result<Option<String>, StoreError>;

    /// Record `value` as the last notified day.
    async fn write_marker(&self, value: &str) -> Result<(), StoreError>;
}

/// Marker kept as a single object in an S3 bucket.
pub struct S3MarkerStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    key: String,
}

impl S3MarkerStore {
    pub fn new(config: &aws_config::SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
            bucket: bucket.into(),
            key: DEFAULT_MARKER_KEY.to_string(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

#[async_trait]
impl MarkerStore for S3MarkerStore {
    async fn read_marker(&self) -> Result<Option<String>, StoreError> {
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
        {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StoreError::Other(e.to_string()))?
                    .into_bytes();
                // Objects migrated from the file backend carry a trailing
                // newline.
                let value = String::from_utf8_lossy(&data).trim_end().to_string();
                Ok(Some(value))
            }
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(StoreError::Other(service_error.to_string()))
                }
            }
        }
    }

    async fn write_marker(&self, value: &str) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(ByteStream::from(value.as_bytes().to_vec()))
            .send()
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?;
        Ok(())
    }
}

/// Marker kept in a local file, one line appended per notification. The
/// last non-empty line is the current marker; earlier lines remain as a
/// trail of past notifications.
pub struct FileMarkerStore {
    path: PathBuf,
}

impl FileMarkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MarkerStore for FileMarkerStore {
    async fn read_marker(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(contents
                .lines()
                .rev()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn write_marker(&self, value: &str) -> Result<(), StoreError> {
        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", value).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// In-memory store for unit tests.
#[derive(Clone, Default)]
pub struct InMemoryMarkerStore {
    value: Arc<tokio::sync::RwLock<Option<String>>>,
}

impl InMemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarkerStore for InMemoryMarkerStore {
    async fn read_marker(&self) -> Result<Option<String>, StoreError> {
        Ok(self.value.read().await.clone())
    }

    async fn write_marker(&self, value: &str) -> Result<(), StoreError> {
        *self.value.write().await = Some(value.to_string());
        Ok(())
    }
}
