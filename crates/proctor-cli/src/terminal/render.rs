//! Exam screen drawing.

use super::ui::{ExamUi, InputMode};
use colored::Colorize;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use proctor_core::exam::{Phase, QuestionMark, QuestionView, SessionSnapshot};
use proctor_core::markup::{self, TextSegment};
use std::io::{self, Write};

/// Redraws the whole screen.
pub fn render<W: Write>(out: &mut W, snapshot: &SessionSnapshot, ui: &ExamUi) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    for line in screen_lines(snapshot, ui) {
        // Raw mode: no implicit carriage return
        write!(out, "{}\r\n", line)?;
    }
    out.flush()
}

pub fn screen_lines(snapshot: &SessionSnapshot, ui: &ExamUi) -> Vec<String> {
    let mut lines = vec![header(snapshot), String::new()];

    if let Some(alert) = &ui.alert {
        let banner = if alert.escalated {
            format!("!! {} - violation limit reached, submitting", alert.message)
        } else {
            format!(
                "!! {} (violation {} of {})",
                alert.message, alert.count, alert.max_violations
            )
        };
        lines.push(banner.white().on_red().bold().to_string());
        lines.push(String::new());
    }

    match snapshot.phase {
        Phase::Loading => lines.push("Loading assessment...".bright_black().to_string()),
        Phase::InProgress => question_lines(snapshot, &mut lines),
        Phase::Reviewing => review_lines(snapshot, &mut lines),
        Phase::Submitting => lines.push("Submitting your answers...".yellow().to_string()),
        Phase::Finalized => lines.push(
            "Session closed. Your responses have been recorded."
                .bright_green()
                .to_string(),
        ),
    }

    lines.push(String::new());
    match &ui.mode {
        InputMode::Calculator(line) => {
            let result = ui.calc_result.as_deref().unwrap_or("");
            lines.push(format!("{} {}   {}", "calc>".cyan().bold(), line, result.bright_green()));
            lines.push("[Enter] evaluate  [Tab] close".bright_black().to_string());
        }
        InputMode::GoTo(digits) => {
            lines.push(format!("{} {}", "go to question:".cyan().bold(), digits));
            lines.push("[Enter] jump  [Tab] cancel".bright_black().to_string());
        }
        InputMode::Normal => {
            if let Some(help) = key_help(snapshot) {
                lines.push(help.bright_black().to_string());
            }
        }
    }
    if let Some(notice) = &ui.notice {
        lines.push(notice.yellow().to_string());
    }
    lines
}

fn header(snapshot: &SessionSnapshot) -> String {
    let clock = format_clock(snapshot.time_remaining_seconds);
    let clock = if snapshot.time_remaining_seconds < 60 {
        clock.red().bold()
    } else {
        clock.bright_white().bold()
    };

    let strikes = format!(
        "Violations {}/{}",
        snapshot.violations.len(),
        snapshot.max_violations
    );
    let strikes = if snapshot.violations.is_empty() {
        strikes.green()
    } else if snapshot.on_last_strike() {
        strikes.red().bold()
    } else {
        strikes.yellow()
    };

    let mut header = format!(
        "{}  {}  {} ({})  {}  {}",
        "PROCTOR".bright_magenta().bold(),
        snapshot.exam_id,
        snapshot.candidate_name,
        snapshot.candidate_roll_no,
        clock,
        strikes
    );
    if snapshot.camera_degraded {
        header.push_str(&format!("  {}", "camera unavailable".bright_black()));
    }
    header
}

fn question_lines(snapshot: &SessionSnapshot, lines: &mut Vec<String>) {
    let Some(question) = &snapshot.current_question else {
        return;
    };

    let mut title = format!(
        "Question {} of {}  [{} - {} mark{}]",
        snapshot.current_index + 1,
        snapshot.total_questions,
        question.part,
        question.marks,
        if question.marks == 1 { "" } else { "s" }
    )
    .bold()
    .to_string();
    if snapshot.current_flagged {
        title.push_str(&format!("  {}", "flagged".yellow()));
    }
    lines.push(title);
    lines.push(String::new());
    lines.extend(question_text(question));
    if let Some(image) = &question.image_ref {
        lines.push(format!("[figure: {}]", image).bright_black().to_string());
    }
    lines.push(String::new());

    for (index, option) in question.options.iter().enumerate() {
        let selected = snapshot.current_answer == Some(index);
        let line = format!("  {} ({}) {}", if selected { "*" } else { " " }, index + 1, option);
        lines.push(if selected {
            line.bright_green().bold().to_string()
        } else {
            line
        });
    }

    lines.push(String::new());
    lines.push(grid_line(&snapshot.grid));
}

/// Question text with math segments highlighted; display math on its own line.
fn question_text(question: &QuestionView) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for segment in markup::segments(&question.text) {
        match segment {
            TextSegment::Plain(text) => current.push_str(&text),
            TextSegment::InlineMath(math) => current.push_str(&math.cyan().italic().to_string()),
            TextSegment::DisplayMath(math) => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                lines.push(format!("    {}", math.cyan().italic()));
            }
        }
    }
    if !current.trim().is_empty() {
        lines.push(current);
    }
    lines
}

fn grid_line(grid: &[QuestionMark]) -> String {
    grid.iter()
        .enumerate()
        .map(|(index, mark)| {
            let cell = format!("{:>2}", index + 1);
            match mark {
                QuestionMark::Current => cell.black().on_white().to_string(),
                QuestionMark::Flagged => cell.yellow().bold().to_string(),
                QuestionMark::Answered => cell.green().to_string(),
                QuestionMark::Unanswered => cell.bright_black().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn review_lines(snapshot: &SessionSnapshot, lines: &mut Vec<String>) {
    let summary = &snapshot.summary;
    lines.push("Review before submitting".bold().to_string());
    lines.push(String::new());
    lines.push(format!(
        "  Answered     {}/{}",
        summary.answered, summary.total_questions
    ));
    lines.push(format!("  Flagged      {}", summary.flagged));
    lines.push(format!("  Violations   {}", summary.violations));
    lines.push(format!("  Total marks  {}", summary.total_marks));
    lines.push(String::new());
    lines.push(grid_line(&snapshot.grid));
}

fn key_help(snapshot: &SessionSnapshot) -> Option<String> {
    let calc = if snapshot.calculator_enabled {
        "  [k] calculator"
    } else {
        ""
    };
    match snapshot.phase {
        Phase::InProgress => Some(format!(
            "[<-/p] prev  [->/n] next  [1-{}] answer  [f] flag  [g] go to{}",
            snapshot
                .current_question
                .as_ref()
                .map_or(4, |q| q.options.len()),
            calc
        )),
        Phase::Reviewing => Some(format!("[s] submit  [b] back{}", calc)),
        _ => None,
    }
}

/// `mm:ss`, minutes unbounded.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
