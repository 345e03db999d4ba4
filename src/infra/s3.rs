//! S3-backed collaborators.
//!
//! Tables live under `<prefix><name>.csv[.gz]`; backups are server-side copies
//! under `<prefix>backups/<destination>/<stamp>.csv[.gz]`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use polars::prelude::DataFrame;
use tracing::{debug, error, info};

use crate::infra::{SAVED_TIMESTAMP, backup_stamp, stamp_table, table_file_name};
use crate::output::encode_table;
use crate::parser::parse_table;
use crate::services::{DataBackup, DataSaver, DataSource};

/// Location shared by the S3 collaborators.
#[derive(Debug, Clone)]
pub struct S3Location {
    pub bucket: String,
    pub prefix: String,
}

impl S3Location {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self {
            bucket: bucket.into(),
            prefix,
        }
    }

    pub fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }
}

/// Reads source tables from objects in a bucket.
pub struct S3Source {
    client: aws_sdk_s3::Client,
    location: S3Location,
}

impl S3Source {
    pub fn new(client: aws_sdk_s3::Client, location: S3Location) -> Self {
        Self { client, location }
    }
}

#[async_trait]
impl DataSource for S3Source {
    async fn get_data(&self, identifier: &str) -> Result<DataFrame> {
        let key = self.location.key(identifier);
        let resp = match self
            .client
            .get_object()
            .bucket(&self.location.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                debug!(bucket = %self.location.bucket, key = %key, "Source object does not exist");
                return Ok(DataFrame::empty());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("S3 GetObject failed for '{key}'"));
            }
        };

        let body = resp
            .body
            .collect()
            .await
            .with_context(|| format!("failed to read body of '{key}'"))?
            .into_bytes();
        parse_table(&body).with_context(|| format!("failed to parse '{key}'"))
    }
}

/// Uploads graded tables as CSV objects.
pub struct S3Saver {
    client: aws_sdk_s3::Client,
    location: S3Location,
    gzip: bool,
}

impl S3Saver {
    pub fn new(client: aws_sdk_s3::Client, location: S3Location, gzip: bool) -> Self {
        Self {
            client,
            location,
            gzip,
        }
    }

    async fn upload(&self, mut df: DataFrame, key: &str) -> Result<()> {
        stamp_table(&mut df, SAVED_TIMESTAMP, Utc::now())?;
        let body = encode_table(&mut df, self.gzip)?;

        let mut req = self
            .client
            .put_object()
            .bucket(&self.location.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type("text/csv");
        if self.gzip {
            req = req.content_encoding("gzip");
        }
        req.send()
            .await
            .with_context(|| format!("S3 PutObject failed for '{key}'"))?;
        Ok(())
    }
}

#[async_trait]
impl DataSaver for S3Saver {
    async fn save_data(&self, table: DataFrame, destination: &str) -> bool {
        let key = self.location.key(&table_file_name(destination, self.gzip));
        match self.upload(table, &key).await {
            Ok(()) => {
                info!(bucket = %self.location.bucket, key = %key, "Table uploaded");
                true
            }
            Err(e) => {
                error!(bucket = %self.location.bucket, key = %key, error = %format!("{e:#}"), "Failed to upload table");
                false
            }
        }
    }
}

/// Copies the current object of a destination to a timestamped backup key.
pub struct S3Backup {
    client: aws_sdk_s3::Client,
    location: S3Location,
    gzip: bool,
}

impl S3Backup {
    /// `location` and `gzip` must match the [`S3Saver`] being backed up.
    pub fn new(client: aws_sdk_s3::Client, location: S3Location, gzip: bool) -> Self {
        Self {
            client,
            location,
            gzip,
        }
    }

    pub fn backup_key(&self, destination: &str, stamp: &str) -> String {
        self.location.key(&format!(
            "backups/{destination}/{}",
            table_file_name(stamp, self.gzip)
        ))
    }
}

#[async_trait]
impl DataBackup for S3Backup {
    async fn backup_data(&self, destination: &str) -> Result<()> {
        let bucket = &self.location.bucket;
        let key = self.location.key(&table_file_name(destination, self.gzip));

        match self.client.head_object().bucket(bucket).key(&key).send().await {
            Ok(_) => {}
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => {
                debug!(bucket = %bucket, key = %key, "Nothing to back up");
                return Ok(());
            }
            Err(e) => return Err(e).with_context(|| format!("S3 HeadObject failed for '{key}'")),
        }

        let target = self.backup_key(destination, &backup_stamp(Utc::now()));
        self.client
            .copy_object()
            .bucket(bucket)
            .copy_source(format!("{bucket}/{key}"))
            .key(&target)
            .send()
            .await
            .with_context(|| format!("S3 CopyObject failed for '{key}'"))?;

        info!(bucket = %bucket, key = %target, "Backup copied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_normalizes_prefix() {
        assert_eq!(S3Location::new("b", "aaa").key("x.csv"), "aaa/x.csv");
        assert_eq!(S3Location::new("b", "aaa/").key("x.csv"), "aaa/x.csv");
        assert_eq!(S3Location::new("b", "").key("x.csv"), "x.csv");
    }

    #[test]
    fn test_backup_key_layout() {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        let client = aws_sdk_s3::Client::from_conf(config);
        let backup = S3Backup::new(client, S3Location::new("bucket", "ratings"), true);

        assert_eq!(
            backup.backup_key("AAA_all", "20250131T094500.000Z"),
            "ratings/backups/AAA_all/20250131T094500.000Z.csv.gz"
        );
    }
}
