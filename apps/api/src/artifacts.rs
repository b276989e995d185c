//! Artifact store for interview audio and reports (MinIO locally, S3 in production).

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::S3Settings;

#[derive(Clone)]
pub struct ArtifactStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl ArtifactStore {
    /// Constructs an S3 client configured for MinIO (local) or AWS (production).
    pub async fn connect(settings: &S3Settings) -> Self {
        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None,
            None,
            "jobmittr-static",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(&settings.endpoint)
            .load()
            .await;

        // MinIO needs path-style addressing.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
        }
    }

    pub async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        info!("Uploaded artifact to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 download failed: {e}"))?;

        let data = object
            .body
            .collect()
            .await
            .context("Failed to read S3 object body")?;
        Ok(data.into_bytes().to_vec())
    }
}

pub fn question_audio_key(thread_id: &str, question_index: usize, at: DateTime<Utc>) -> String {
    format!(
        "interviews/{thread_id}/q{question_index}_{}.mp3",
        at.format("%Y%m%d%H%M%S")
    )
}

pub fn answer_audio_key(
    thread_id: &str,
    question_index: usize,
    mime: &str,
    at: DateTime<Utc>,
) -> String {
    format!(
        "interviews/{thread_id}/a{question_index}_{}.{}",
        at.format("%Y%m%d%H%M%S"),
        audio_extension(mime)
    )
}

pub fn report_key(thread_id: &str, file_name: &str) -> String {
    format!("interviews/{thread_id}/{file_name}")
}

fn audio_extension(mime: &str) -> &'static str {
    match mime.split(';').next().unwrap_or_default().trim() {
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/webm" => "webm",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" => "ogg",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_audio_keys() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            question_audio_key("interview_u1_sre", 3, at),
            "interviews/interview_u1_sre/q3_20260102030405.mp3"
        );
        assert_eq!(
            answer_audio_key("t", 0, "audio/webm;codecs=opus", at),
            "interviews/t/a0_20260102030405.webm"
        );
        assert_eq!(
            answer_audio_key("t", 1, "application/octet-stream", at),
            "interviews/t/a1_20260102030405.bin"
        );
    }

    #[test]
    fn test_report_key() {
        assert_eq!(
            report_key("t", "interview_report_SRE_20260102_030405.md"),
            "interviews/t/interview_report_SRE_20260102_030405.md"
        );
    }
}
