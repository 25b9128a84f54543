//! Exam screen input handling.
//!
//! Turns candidate key presses into session commands. Integrity-relevant
//! keys never reach this module; the host translates them into signals.

use crossterm::event::{KeyCode, KeyEvent};
use proctor_core::calculator::MAX_EXPRESSION_LEN;
use proctor_core::exam::{Phase, SessionSnapshot, ViolationAlert};
use proctor_execution::SessionCommand;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Calculator line being edited
    Calculator(String),
    /// 1-based question number being typed
    GoTo(String),
}

/// What the driver should do after a key press.
#[derive(Debug)]
pub enum UiAction {
    Nothing,
    Redraw,
    Command(SessionCommand),
    Evaluate(String),
}

#[derive(Debug, Default)]
pub struct ExamUi {
    pub mode: InputMode,
    /// Most recent violation, shown until the next key press
    pub alert: Option<ViolationAlert>,
    pub notice: Option<String>,
    pub calc_result: Option<String>,
}

impl ExamUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key(&mut self, key: KeyEvent, snapshot: &SessionSnapshot) -> UiAction {
        let dismissed = self.alert.take().is_some() | self.notice.take().is_some();

        let action = match std::mem::take(&mut self.mode) {
            InputMode::Calculator(line) => self.on_calculator_key(key, line),
            InputMode::GoTo(digits) => self.on_goto_key(key, digits, snapshot),
            InputMode::Normal => match snapshot.phase {
                Phase::InProgress => self.on_question_key(key, snapshot),
                Phase::Reviewing => self.on_review_key(key, snapshot),
                Phase::Loading | Phase::Submitting | Phase::Finalized => UiAction::Nothing,
            },
        };

        match action {
            UiAction::Nothing if dismissed => UiAction::Redraw,
            other => other,
        }
    }

    fn on_question_key(&mut self, key: KeyEvent, snapshot: &SessionSnapshot) -> UiAction {
        match key.code {
            KeyCode::Left | KeyCode::Char('p') => UiAction::Command(SessionCommand::Previous),
            KeyCode::Right | KeyCode::Char('n') => {
                if snapshot.current_index + 1 < snapshot.total_questions {
                    UiAction::Command(SessionCommand::Next)
                } else if snapshot.review_enabled {
                    UiAction::Command(SessionCommand::RequestReview)
                } else {
                    UiAction::Command(SessionCommand::Submit)
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                let Some(question) = &snapshot.current_question else {
                    return UiAction::Nothing;
                };
                let option_index = (c as usize) - ('1' as usize);
                if option_index >= question.options.len() {
                    self.notice = Some(format!("Choose 1-{}", question.options.len()));
                    return UiAction::Redraw;
                }
                UiAction::Command(SessionCommand::Answer {
                    question_id: question.id.clone(),
                    option_index,
                })
            }
            KeyCode::Char('f') => match &snapshot.current_question {
                Some(question) => UiAction::Command(SessionCommand::ToggleFlag(question.id.clone())),
                None => UiAction::Nothing,
            },
            KeyCode::Char('g') => {
                self.mode = InputMode::GoTo(String::new());
                UiAction::Redraw
            }
            KeyCode::Char('k') => self.open_calculator(snapshot),
            _ => UiAction::Nothing,
        }
    }

    fn on_review_key(&mut self, key: KeyEvent, snapshot: &SessionSnapshot) -> UiAction {
        match key.code {
            KeyCode::Char('s') | KeyCode::Enter => UiAction::Command(SessionCommand::Submit),
            KeyCode::Char('b') | KeyCode::Left => {
                UiAction::Command(SessionCommand::ResumeFromReview)
            }
            KeyCode::Char('k') => self.open_calculator(snapshot),
            _ => UiAction::Nothing,
        }
    }

    fn open_calculator(&mut self, snapshot: &SessionSnapshot) -> UiAction {
        if snapshot.calculator_enabled {
            self.mode = InputMode::Calculator(String::new());
            self.calc_result = None;
        } else {
            self.notice = Some("Calculator is disabled for this exam".to_string());
        }
        UiAction::Redraw
    }

    fn on_calculator_key(&mut self, key: KeyEvent, mut line: String) -> UiAction {
        match key.code {
            KeyCode::Tab => return UiAction::Redraw,
            KeyCode::Enter => {
                let expression = line.clone();
                self.mode = InputMode::Calculator(line);
                return UiAction::Evaluate(expression);
            }
            KeyCode::Backspace => {
                line.pop();
            }
            KeyCode::Char(c) if line.chars().count() < MAX_EXPRESSION_LEN => line.push(c),
            _ => {}
        }
        self.mode = InputMode::Calculator(line);
        UiAction::Redraw
    }

    fn on_goto_key(&mut self, key: KeyEvent, mut digits: String, snapshot: &SessionSnapshot) -> UiAction {
        match key.code {
            KeyCode::Tab => return UiAction::Redraw,
            KeyCode::Enter => {
                return match digits.parse::<usize>() {
                    Ok(number) if (1..=snapshot.total_questions).contains(&number) => {
                        UiAction::Command(SessionCommand::GoTo(number - 1))
                    }
                    _ => {
                        self.notice = Some(format!(
                            "Enter a question number between 1 and {}",
                            snapshot.total_questions
                        ));
                        UiAction::Redraw
                    }
                };
            }
            KeyCode::Backspace => {
                digits.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() => digits.push(c),
            _ => {}
        }
        self.mode = InputMode::GoTo(digits);
        UiAction::Redraw
    }
}
