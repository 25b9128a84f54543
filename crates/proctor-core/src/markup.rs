//! Math markup segmentation for question text.
//!
//! Question text may embed `$...$` (inline) and `$$...$$` (display) math.
//! Renderers receive the text pre-split so they can style each part.
//! An unterminated delimiter is kept as plain text.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum TextSegment {
    Plain(String),
    InlineMath(String),
    DisplayMath(String),
}

pub fn segments(text: &str) -> Vec<TextSegment> {
    let mut out = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(start) = rest.find('$') {
        let (delimiter, display) = if rest[start..].starts_with("$$") {
            ("$$", true)
        } else {
            ("$", false)
        };
        let body_start = start + delimiter.len();
        let Some(len) = rest[body_start..].find(delimiter) else {
            break;
        };

        plain.push_str(&rest[..start]);
        if !plain.is_empty() {
            out.push(TextSegment::Plain(std::mem::take(&mut plain)));
        }
        let body = rest[body_start..body_start + len].to_string();
        out.push(if display {
            TextSegment::DisplayMath(body)
        } else {
            TextSegment::InlineMath(body)
        });
        rest = &rest[body_start + len + delimiter.len()..];
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        out.push(TextSegment::Plain(plain));
    }
    out
}
