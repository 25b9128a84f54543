use proctor_core::error::{ProctorError, Result};
use proctor_core::exam::{Question, QuestionPart};
use serde::Deserialize;
use serde_json::Value;

/// A value the backend may send either as a string or as a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Text(s) => s.trim().to_string(),
        }
    }

    fn as_index(&self) -> Option<usize> {
        match self {
            Scalar::Int(n) => usize::try_from(*n).ok(),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Options arrive as a list, or as a JSON-encoded list inside a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionsField {
    List(Vec<String>),
    Encoded(String),
}

impl OptionsField {
    fn decode(self) -> Result<Vec<String>> {
        match self {
            OptionsField::List(list) => Ok(list),
            OptionsField::Encoded(raw) => Ok(serde_json::from_str(&raw)?),
        }
    }
}

/// Question record as served by `getQuestions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub id: Scalar,
    #[serde(default)]
    pub exam_id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub options: OptionsField,
    pub correct_answer: Scalar,
    pub part: QuestionPart,
}

impl TryFrom<QuestionDto> for Question {
    type Error = ProctorError;

    fn try_from(dto: QuestionDto) -> Result<Self> {
        let id = dto.id.as_text();
        let correct_answer_index = dto.correct_answer.as_index().ok_or_else(|| {
            ProctorError::Serialization {
                format: "JSON".to_string(),
                message: format!("question '{id}' has a non-numeric answer key"),
            }
        })?;
        Ok(Question {
            options: dto.options.decode()?,
            text: dto.text,
            correct_answer_index,
            image_ref: dto.image_url.filter(|url| !url.trim().is_empty()),
            part: dto.part,
            id,
        })
    }
}

/// Decodes a `getQuestions` response body.
///
/// Records that cannot be decoded are skipped with a warning; a body that
/// is not an array at all is an error.
pub fn decode_question_bank(body: Value) -> Result<Vec<Question>> {
    let Value::Array(records) = body else {
        return Err(ProctorError::Serialization {
            format: "JSON".to_string(),
            message: "question bank is not an array".to_string(),
        });
    };

    let mut questions = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let decoded = serde_json::from_value::<QuestionDto>(record)
            .map_err(ProctorError::from)
            .and_then(Question::try_from);
        match decoded {
            Ok(question) => questions.push(question),
            Err(e) => tracing::warn!("[QuestionDto] Skipping record {}: {}", index, e),
        }
    }
    Ok(questions)
}
