//! Wire formats of the Exam Backend Service.
//!
//! The backend is spreadsheet-backed, so records arrive loosely typed:
//! options may be a JSON-encoded string, numbers may be strings.

mod question;
mod result;

pub use question::{QuestionDto, decode_question_bank};
pub use result::SubmitExamBody;
