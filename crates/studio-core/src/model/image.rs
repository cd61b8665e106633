//! Image generation jobs.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::{ProtocolError, ValidationError};
use crate::request::MultipartForm;

/// Image generation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }

    /// Model used when the caller does not pick one.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "dall-e-3",
            Provider::Gemini => "gemini-2.5-flash-image-preview",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            other => Err(format!("unknown provider '{other}' (expected openai or gemini)")),
        }
    }
}

/// Lifecycle of an image job. Non-terminal while queued or processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[serde(alias = "pending")]
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A job record as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageJob {
    pub id: u64,
    #[serde(default)]
    pub thread: Option<u64>,
    pub provider: String,
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub output_images: Vec<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub credits_spent: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ImageJob {
    /// Output images, classified as URL or inline payload.
    pub fn outputs(&self) -> impl Iterator<Item = OutputImage<'_>> {
        self.output_images.iter().map(|s| OutputImage::classify(s))
    }
}

/// One generated image: either an absolute URL or a base64 payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputImage<'a> {
    Url(&'a str),
    Base64(&'a str),
}

impl<'a> OutputImage<'a> {
    /// Classify by prefix: anything starting with `http` is a URL.
    pub fn classify(raw: &'a str) -> Self {
        if raw.starts_with("http") {
            OutputImage::Url(raw)
        } else {
            OutputImage::Base64(raw)
        }
    }

    /// A value usable as an image source: the URL itself or a PNG data URI.
    pub fn to_src(&self) -> Cow<'a, str> {
        match *self {
            OutputImage::Url(url) => Cow::Borrowed(url),
            OutputImage::Base64(data) => Cow::Owned(format!("data:image/png;base64,{data}")),
        }
    }

    /// Decode an inline payload. URLs yield `None`.
    pub fn decode(&self) -> Result<Option<Vec<u8>>> {
        match *self {
            OutputImage::Url(_) => Ok(None),
            OutputImage::Base64(data) => STANDARD
                .decode(data.trim())
                .map(Some)
                .map_err(|e| {
                    ProtocolError::UnexpectedResponse {
                        message: format!("invalid base64 image payload: {e}"),
                    }
                    .into()
                }),
        }
    }
}

/// A file uploaded alongside the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Input for an image generation submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub provider: Provider,
    pub model: String,
    pub prompt: String,
    pub thread: Option<u64>,
    pub images: Vec<ImageUpload>,
}

impl ImageRequest {
    /// A request using the provider's default model, outside any thread.
    pub fn new(provider: Provider, prompt: impl Into<String>) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            prompt: prompt.into(),
            thread: None,
            images: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn in_thread(mut self, thread: u64) -> Self {
        self.thread = Some(thread);
        self
    }

    pub fn attach(mut self, upload: ImageUpload) -> Self {
        self.images.push(upload);
        self
    }

    /// Validate and encode as the multipart submission form.
    pub fn to_form(&self) -> Result<MultipartForm> {
        if self.prompt.trim().is_empty() {
            return Err(ValidationError::EmptyPrompt.into());
        }

        let mut form = MultipartForm::new()
            .text("provider", self.provider.as_str())
            .text("model", self.model.as_str())
            .text("prompt", self.prompt.as_str());

        if let Some(thread) = self.thread {
            form = form.text("thread", thread.to_string());
        }

        for upload in &self.images {
            form = form.file(
                "images",
                upload.file_name.as_str(),
                upload.mime.clone(),
                upload.bytes.clone(),
            );
        }

        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pending_is_an_alias_for_queued() {
        let status: JobStatus = serde_json::from_value(json!("pending")).unwrap();
        assert_eq!(status, JobStatus::Queued);
        assert!(!status.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn job_record_decodes() {
        let job: ImageJob = serde_json::from_value(json!({
            "id": 7,
            "thread": null,
            "provider": "openai",
            "model": "dall-e-3",
            "prompt": "a cat",
            "input_images": [],
            "output_images": ["https://cdn.example/a.png", "iVBORw0KGgo="],
            "status": "completed",
            "credits_spent": 1,
            "created_at": "2025-03-01T10:00:00.123456Z",
            "completed_at": "2025-03-01T10:00:05Z"
        }))
        .unwrap();

        let outputs: Vec<_> = job.outputs().collect();
        assert_eq!(outputs[0], OutputImage::Url("https://cdn.example/a.png"));
        assert_eq!(outputs[1], OutputImage::Base64("iVBORw0KGgo="));
        assert!(job.created_at.is_some());
    }

    #[test]
    fn output_image_sources() {
        assert_eq!(
            OutputImage::classify("https://x/y.png").to_src(),
            "https://x/y.png"
        );
        assert_eq!(
            OutputImage::classify("AAAA").to_src(),
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn output_image_decoding() {
        let bytes = OutputImage::classify("aGVsbG8=").decode().unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"hello"[..]));
        assert!(OutputImage::classify("http://x").decode().unwrap().is_none());
        assert!(OutputImage::classify("not base64!").decode().is_err());
    }

    #[test]
    fn empty_prompt_is_rejected() {
        let err = ImageRequest::new(Provider::OpenAi, "   ").to_form().unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Validation(ValidationError::EmptyPrompt)
        ));
    }

    #[test]
    fn form_carries_fields_and_files() {
        let form = ImageRequest::new(Provider::Gemini, "a fox")
            .in_thread(3)
            .attach(ImageUpload {
                file_name: "ref.png".into(),
                mime: Some("image/png".into()),
                bytes: vec![1, 2, 3],
            })
            .to_form()
            .unwrap();

        assert_eq!(form.field("provider"), Some("gemini"));
        assert_eq!(form.field("model"), Some("gemini-2.5-flash-image-preview"));
        assert_eq!(form.field("thread"), Some("3"));
        assert_eq!(form.files().len(), 1);
        assert_eq!(form.files()[0].field, "images");
    }

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert!("midjourney".parse::<Provider>().is_err());
    }
}
