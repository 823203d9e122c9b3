//! Navigation state machine.
//!
//! Inbound callback tokens are parsed once at the boundary into a closed
//! [`Action`] set, so the transition function is total over a finite
//! variant set instead of matching string prefixes all over the place.
//! There is no back-stack: every "back" action names its target screen.

use std::fmt;

use crate::catalog::Subject;
use crate::session::{Mode, Session};

// Callback token grammar. Buttons emit these and `Action::parse`
// recognizes exactly the same set.
const TOKEN_MENU: &str = "menu";
const TOKEN_START: &str = "start";
pub(crate) const TOKEN_BACK_MAIN: &str = "back:main";
pub(crate) const TOKEN_WEEKS: &str = "fichas";
pub(crate) const TOKEN_BACK_WEEKS: &str = "back:weeks";
pub(crate) const TOKEN_ANNOUNCEMENTS: &str = "comunicados";
pub(crate) const TOKEN_EVALUATIONS: &str = "evaluaciones";
pub(crate) const TOKEN_TUTOR: &str = "tutor";
pub(crate) const TOKEN_TUTOR_ASK: &str = "tutor:ask";
pub(crate) const TOKEN_TUTOR_RESET: &str = "tutor:reset";
pub(crate) const TOKEN_TUTOR_EXIT: &str = "tutor:exit";

/// Returns the callback token selecting a week.
pub fn week_token(week: u32) -> String {
    format!("sem:{week}")
}

/// Returns the callback token requesting a subject's document for a week.
pub fn subject_token(week: u32, subject: Subject) -> String {
    format!("ficha:{}:{}", week, subject.key())
}

/// Returns the callback token returning to a week's subject list.
pub fn subjects_back_token(week: u32) -> String {
    format!("back:subjects:{week}")
}

/// A discrete navigation action, parsed from a callback token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OpenMenu,
    OpenWeekList,
    SelectWeek(u32),
    ReturnToWeekList,
    SelectSubject { week: u32, subject: Subject },
    ReturnToSubjectList(u32),
    ShowAnnouncements,
    ShowEvaluations,
    EnterTutor,
    TutorPrompt,
    TutorReset,
    ExitTutor,
}

impl Action {
    /// Parses a callback token. Unknown or malformed tokens yield `None`;
    /// the caller logs and ignores them.
    pub fn parse(token: &str) -> Option<Action> {
        match token.trim() {
            TOKEN_MENU | TOKEN_START | TOKEN_BACK_MAIN => Some(Action::OpenMenu),
            TOKEN_WEEKS => Some(Action::OpenWeekList),
            TOKEN_BACK_WEEKS => Some(Action::ReturnToWeekList),
            TOKEN_ANNOUNCEMENTS => Some(Action::ShowAnnouncements),
            TOKEN_EVALUATIONS => Some(Action::ShowEvaluations),
            TOKEN_TUTOR => Some(Action::EnterTutor),
            TOKEN_TUTOR_ASK => Some(Action::TutorPrompt),
            TOKEN_TUTOR_RESET => Some(Action::TutorReset),
            TOKEN_TUTOR_EXIT => Some(Action::ExitTutor),
            other => {
                if let Some(rest) = other.strip_prefix("sem:") {
                    return rest.parse().ok().map(Action::SelectWeek);
                }
                if let Some(rest) = other.strip_prefix("back:subjects:") {
                    return rest.parse().ok().map(Action::ReturnToSubjectList);
                }
                if let Some(rest) = other.strip_prefix("ficha:") {
                    let (week, key) = rest.split_once(':')?;
                    let week = week.parse().ok()?;
                    let subject = Subject::from_key(key)?;
                    return Some(Action::SelectSubject { week, subject });
                }
                None
            }
        }
    }
}

/// A screen descriptor. Transient: recomputed on every render, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    WeekList,
    SubjectList { week: u32 },
    Announcements,
    Evaluations,
    ChatPanel,
}

/// What the caller must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Replace the displayed screen.
    Render(Screen),
    /// Send the document for (week, subject), then redisplay a return
    /// control. The screen does not change.
    SendDocument { week: u32, subject: Subject },
}

/// Defensive rejection of actions that no well-behaved control produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavError {
    WeekOutOfRange { week: u32, total_weeks: u32 },
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::WeekOutOfRange { week, total_weeks } => {
                write!(f, "week {week} out of range 1..={total_weeks}")
            }
        }
    }
}

impl std::error::Error for NavError {}

fn check_week(week: u32, total_weeks: u32) -> Result<(), NavError> {
    if week >= 1 && week <= total_weeks {
        Ok(())
    } else {
        Err(NavError::WeekOutOfRange { week, total_weeks })
    }
}

/// Advances the session by one action.
///
/// Deterministic: the step depends only on the action and the session's
/// mode/history, both of which it mutates in place where the transition
/// table says so.
pub fn advance(session: &mut Session, action: &Action, total_weeks: u32) -> Result<Step, NavError> {
    match action {
        Action::OpenMenu => {
            session.mode = Mode::Browsing;
            Ok(Step::Render(Screen::MainMenu))
        }
        Action::OpenWeekList | Action::ReturnToWeekList => Ok(Step::Render(Screen::WeekList)),
        Action::SelectWeek(week) | Action::ReturnToSubjectList(week) => {
            check_week(*week, total_weeks)?;
            Ok(Step::Render(Screen::SubjectList { week: *week }))
        }
        Action::SelectSubject { week, subject } => {
            check_week(*week, total_weeks)?;
            Ok(Step::SendDocument {
                week: *week,
                subject: *subject,
            })
        }
        Action::ShowAnnouncements => Ok(Step::Render(Screen::Announcements)),
        Action::ShowEvaluations => Ok(Step::Render(Screen::Evaluations)),
        Action::EnterTutor => {
            // Re-entry keeps any existing history.
            session.mode = Mode::Tutor;
            Ok(Step::Render(Screen::ChatPanel))
        }
        Action::TutorPrompt => Ok(Step::Render(Screen::ChatPanel)),
        Action::TutorReset => {
            session.history.clear();
            Ok(Step::Render(Screen::ChatPanel))
        }
        Action::ExitTutor => {
            session.mode = Mode::Browsing;
            Ok(Step::Render(Screen::MainMenu))
        }
    }
}
