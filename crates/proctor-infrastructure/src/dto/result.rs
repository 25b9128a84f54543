use proctor_core::exam::ResultPayload;
use serde::Serialize;

/// Body of the `submitExam` POST.
#[derive(Debug, Serialize)]
pub struct SubmitExamBody<'a> {
    pub action: &'static str,
    #[serde(flatten)]
    pub payload: &'a ResultPayload,
}

impl<'a> SubmitExamBody<'a> {
    pub fn new(payload: &'a ResultPayload) -> Self {
        Self {
            action: "submitExam",
            payload,
        }
    }
}
