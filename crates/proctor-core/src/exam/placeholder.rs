//! Locally generated question set for degraded / demo sessions.
//!
//! Used when the backend is unreachable or serves an empty bank, so the
//! session can still run its full lifecycle.

use super::model::{Question, QuestionPart};
use rand::Rng;
use rand::distributions::Alphanumeric;

pub const PLACEHOLDER_QUESTION_COUNT: usize = 15;
const PART_A_COUNT: usize = 10;

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

/// Builds the placeholder bank: 10 Part A questions followed by 5 Part B.
pub fn placeholder_questions() -> Vec<Question> {
    (0..PLACEHOLDER_QUESTION_COUNT)
        .map(|i| Question {
            id: format!("q-{}-{}", i, random_suffix()),
            text: if i % 4 == 0 {
                r"Solve for $x$: $\int_0^x 2t \, dt = 16$".to_string()
            } else {
                "What is the institutional protocol for secure sessions?".to_string()
            },
            options: vec![
                "4".to_string(),
                "Protocol A".to_string(),
                "Institutional Lock".to_string(),
                "Data Sync".to_string(),
            ],
            correct_answer_index: 0,
            image_ref: (i == 4).then(|| format!("https://picsum.photos/600/300?grayscale&random={i}")),
            part: if i < PART_A_COUNT {
                QuestionPart::A
            } else {
                QuestionPart::B
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_placeholder_bank_shape() {
        let bank = placeholder_questions();
        assert_eq!(bank.len(), PLACEHOLDER_QUESTION_COUNT);
        assert!(bank.iter().all(|q| q.validate().is_ok()));
        assert_eq!(bank.iter().filter(|q| q.part == QuestionPart::A).count(), 10);
        assert!(bank[4].image_ref.is_some());
        assert!(bank[0].text.contains('$'));

        let ids: HashSet<_> = bank.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), bank.len());
    }
}
