//! [`InfographicsCache`] backed by an S3 bucket.
//!
//! Each request is stored as one JSON object under
//! `infographics/news_flash_id={id}/years_ago={n}.json`, optionally
//! gzip-compressed with a `.gz` suffix.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::{debug, info};

use crate::services::InfographicsCache;
use crate::widgets::SerializedWidget;

pub struct S3InfographicsCache {
    client: aws_sdk_s3::Client,
    bucket: String,
    gzip: bool,
}

impl S3InfographicsCache {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>, gzip: bool) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            gzip,
        }
    }

    /// Builds a client from the ambient AWS configuration.
    pub async fn from_env(bucket: impl Into<String>, gzip: bool) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket, gzip)
    }
}

pub fn object_key(news_flash_id: i64, years_ago: i64, gzip: bool) -> String {
    let key = format!("infographics/news_flash_id={news_flash_id}/years_ago={years_ago}.json");
    if gzip { format!("{key}.gz") } else { key }
}

pub fn encode_body(widgets: &[SerializedWidget], gzip: bool) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(widgets)?;
    if !gzip {
        return Ok(json);
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

pub fn decode_body(body: &[u8], gzip: bool) -> Result<Vec<SerializedWidget>> {
    if !gzip {
        return Ok(serde_json::from_slice(body)?);
    }
    let mut json = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut json)
        .context("failed to decompress cached infographics")?;
    Ok(serde_json::from_slice(&json)?)
}

#[async_trait::async_trait]
impl InfographicsCache for S3InfographicsCache {
    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    async fn get(
        &self,
        news_flash_id: i64,
        years_ago: i64,
    ) -> Result<Option<Vec<SerializedWidget>>> {
        let key = object_key(news_flash_id, years_ago, self.gzip);
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                debug!(key = %key, "Cache miss");
                return Ok(None);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("S3 GetObject failed for '{key}'"));
            }
        };

        let body: Bytes = output
            .body
            .collect()
            .await
            .with_context(|| format!("failed to read S3 object '{key}'"))?
            .into_bytes();
        debug!(key = %key, bytes = body.len(), "Cache hit");
        decode_body(&body, self.gzip).map(Some)
    }

    #[tracing::instrument(skip(self, widgets), fields(bucket = %self.bucket, count = widgets.len()))]
    async fn put(
        &self,
        news_flash_id: i64,
        years_ago: i64,
        widgets: &[SerializedWidget],
    ) -> Result<()> {
        let key = object_key(news_flash_id, years_ago, self.gzip);
        let body = encode_body(widgets, self.gzip)?;
        let size = body.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type("application/json")
            .send()
            .await
            .with_context(|| format!("S3 PutObject failed for '{key}'"))?;

        info!(key = %key, bytes = size, "Cached infographics uploaded");
        Ok(())
    }
}
