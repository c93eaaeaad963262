use std::time::Duration;

use async_trait::async_trait;
use derive_new::new;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use crate::errors::Error;

pub const SPEECHMATICS_BASE_URL: &str = "https://asr.api.speechmatics.com/v2";

const TRANSCRIPTION_LANGUAGE: &str = "en";
const OPERATING_POINT: &str = "enhanced";
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_POLLS: usize = 300;

/// An uploaded recording of a spoken query.
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct AudioClip {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Turns recorded speech into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, clip: AudioClip) -> Result<String, Error>;
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Done,
    Rejected,
    Expired,
    #[serde(other)]
    Other,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Rejected => "rejected",
            JobStatus::Expired => "expired",
            JobStatus::Other => "other",
        }
    }
}

#[derive(Debug, Deserialize)]
struct JobCreated {
    id: String,
}

#[derive(Debug, Deserialize)]
struct JobDetails {
    job: JobSummary,
}

#[derive(Debug, Deserialize)]
struct JobSummary {
    status: JobStatus,
}

fn job_config() -> serde_json::Value {
    json!({
        "type": "transcription",
        "transcription_config": {
            "language": TRANSCRIPTION_LANGUAGE,
            "operating_point": OPERATING_POINT,
        }
    })
}

fn transcription_error(err: impl std::fmt::Display) -> Error {
    Error::Transcription {
        message: err.to_string(),
    }
}

/// Batch transcription through the Speechmatics jobs API: upload, poll until
/// the job settles, then fetch the plain-text transcript.
#[derive(Clone, Debug)]
pub struct SpeechmaticsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
    max_polls: usize,
}

impl SpeechmaticsClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transcription_error)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: SPEECHMATICS_BASE_URL.to_string(),
            poll_interval: POLL_INTERVAL,
            max_polls: MAX_POLLS,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_polling(mut self, poll_interval: Duration, max_polls: usize) -> Self {
        self.poll_interval = poll_interval;
        self.max_polls = max_polls.max(1);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(transcription_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(transcription_error(format!("Speechmatics returned {status}: {body}")));
        }

        Ok(response)
    }

    async fn submit(&self, clip: AudioClip) -> Result<String, Error> {
        let mut audio = Part::bytes(clip.bytes).file_name(clip.file_name);
        if let Some(content_type) = clip.content_type.as_deref() {
            audio = audio.mime_str(content_type).map_err(transcription_error)?;
        }

        let form = Form::new()
            .part("data_file", audio)
            .text("config", job_config().to_string());

        let created: JobCreated = self
            .send(self.client.post(self.endpoint("jobs")).multipart(form))
            .await?
            .json()
            .await
            .map_err(transcription_error)?;

        Ok(created.id)
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, Error> {
        let details: JobDetails = self
            .send(self.client.get(self.endpoint(&format!("jobs/{job_id}"))))
            .await?
            .json()
            .await
            .map_err(transcription_error)?;

        Ok(details.job.status)
    }

    async fn transcript(&self, job_id: &str) -> Result<String, Error> {
        let text = self
            .send(
                self.client
                    .get(self.endpoint(&format!("jobs/{job_id}/transcript")))
                    .query(&[("format", "txt")]),
            )
            .await?
            .text()
            .await
            .map_err(transcription_error)?;

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl Transcriber for SpeechmaticsClient {
    async fn transcribe(&self, clip: AudioClip) -> Result<String, Error> {
        let job_id = self.submit(clip).await?;
        tracing::info!("Transcription job created with ID: {}", job_id);

        for _ in 0..self.max_polls {
            tokio::time::sleep(self.poll_interval).await;

            let status = self.status(&job_id).await?;
            tracing::debug!("Job {} status: {}", job_id, status.as_str());

            match status {
                JobStatus::Done => return self.transcript(&job_id).await,
                JobStatus::Rejected | JobStatus::Expired => {
                    return Err(transcription_error(format!(
                        "Job failed with status: {}",
                        status.as_str()
                    )));
                }
                JobStatus::Running | JobStatus::Other => {}
            }
        }

        Err(transcription_error(format!(
            "Job {job_id} did not finish after {} status checks",
            self.max_polls
        )))
    }
}
