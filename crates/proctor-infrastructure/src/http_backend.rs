//! Exam Backend Service client over HTTP.
//!
//! The backend is a single endpoint: `GET {url}?action=getQuestions&examId=..`
//! returns the question bank, `POST {url}` with `action = "submitExam"` stores
//! a result record.

use crate::dto::{SubmitExamBody, decode_question_bank};
use async_trait::async_trait;
use proctor_core::error::{ProctorError, Result};
use proctor_core::exam::{ExamBackend, Question, ResultPayload, SubmissionOutcome};
use reqwest::Client;
use std::time::Duration;

/// [`ExamBackend`] backed by the remote Exam Backend Service.
#[derive(Clone)]
pub struct HttpExamBackend {
    client: Client,
    url: String,
}

impl HttpExamBackend {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("[HttpExamBackend] Falling back to default client: {}", e);
                Client::new()
            });
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ExamBackend for HttpExamBackend {
    async fn fetch_questions(&self, exam_id: &str) -> Result<Vec<Question>> {
        tracing::debug!("[HttpExamBackend] Fetching questions for exam {}", exam_id);

        let response = self
            .client
            .get(&self.url)
            .query(&[("action", "getQuestions"), ("examId", exam_id)])
            .send()
            .await
            .map_err(|e| ProctorError::backend("fetch questions", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProctorError::backend(
                "fetch questions",
                format!("HTTP {}: {}", status, body),
            ));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProctorError::backend("fetch questions", e.to_string()))?;
        let questions = decode_question_bank(body)?;

        tracing::info!(
            "[HttpExamBackend] Received {} questions for exam {}",
            questions.len(),
            exam_id
        );
        Ok(questions)
    }

    async fn submit_result(&self, payload: &ResultPayload) -> Result<SubmissionOutcome> {
        tracing::debug!(
            "[HttpExamBackend] Submitting result for {} ({})",
            payload.roll_no,
            payload.status
        );

        let response = self
            .client
            .post(&self.url)
            .json(&SubmitExamBody::new(payload))
            .send()
            .await
            .map_err(|e| ProctorError::backend("submit result", e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(SubmissionOutcome::Acknowledged)
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ProctorError::backend(
                "submit result",
                format!("HTTP {}: {}", status, body),
            ))
        }
    }
}
