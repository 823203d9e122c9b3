//! Transport-agnostic screen rendering.
//!
//! Each screen renders to a [`ScreenView`]: text plus rows of labeled
//! controls whose tokens feed back into [`crate::nav::Action::parse`].
//! The messaging front-end maps views onto its own keyboard type.

use crate::announcements::AnnouncementStore;
use crate::calendar;
use crate::catalog::Subject;
use crate::config::CourseConfig;
use crate::docs::DocumentStore;
use crate::nav::{
    Screen, TOKEN_ANNOUNCEMENTS, TOKEN_BACK_MAIN, TOKEN_BACK_WEEKS, TOKEN_EVALUATIONS,
    TOKEN_TUTOR, TOKEN_TUTOR_ASK, TOKEN_TUTOR_EXIT, TOKEN_TUTOR_RESET, TOKEN_WEEKS,
    subject_token, subjects_back_token, week_token,
};

/// Default chat-panel notice when entering the tutor.
pub const CHAT_WELCOME: &str =
    "🤖 Tutor del curso. Escribe tu pregunta y te responderé en base a las asignaturas.";
/// Notice for an explicit prompt request.
pub const CHAT_PROMPT: &str = "✍️ Escribe tu pregunta:";
/// Notice after clearing the history.
pub const CHAT_CLEARED: &str = "🧹 Historial borrado. Empecemos de nuevo.";

/// A labeled control and the callback token it emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: String,
    pub token: String,
}

impl Control {
    fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// A rendered screen: text plus rows of controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    pub text: String,
    pub controls: Vec<Vec<Control>>,
}

fn back_to_menu() -> Vec<Control> {
    vec![Control::new("🔙 Regresar al Menú Principal", TOKEN_BACK_MAIN)]
}

fn main_menu_controls() -> Vec<Vec<Control>> {
    vec![
        vec![Control::new("📚 Fichas Pedagógicas", TOKEN_WEEKS)],
        vec![Control::new("📢 Comunicados", TOKEN_ANNOUNCEMENTS)],
        vec![Control::new("📝 Evaluaciones", TOKEN_EVALUATIONS)],
        vec![Control::new("🤖 Tutor Virtual", TOKEN_TUTOR)],
    ]
}

/// First-contact greeting with the main menu controls.
pub fn welcome() -> ScreenView {
    ScreenView {
        text: "👋 Bienvenido al Asistente Virtual del curso. Elige una opción:".to_string(),
        controls: main_menu_controls(),
    }
}

pub fn main_menu() -> ScreenView {
    ScreenView {
        text: "👋 Menú principal:".to_string(),
        controls: main_menu_controls(),
    }
}

pub fn week_list(course: &CourseConfig) -> ScreenView {
    let mut controls: Vec<Vec<Control>> = (1..=course.total_weeks)
        .map(|week| {
            let label = format!(
                "Semana {} ({})",
                week,
                calendar::week_range_short(course.start_date, week)
            );
            vec![Control::new(label, week_token(week))]
        })
        .collect();
    controls.push(back_to_menu());

    ScreenView {
        text: "Selecciona la semana:".to_string(),
        controls,
    }
}

pub fn subject_list(course: &CourseConfig, docs: &DocumentStore, week: u32) -> ScreenView {
    let mut controls: Vec<Vec<Control>> = Subject::all()
        .iter()
        .filter(|subject| docs.available(week, **subject))
        .map(|subject| vec![Control::new(subject.label(), subject_token(week, *subject))])
        .collect();

    let mut text = calendar::week_header(course.start_date, week);
    if controls.is_empty() {
        text = format!(
            "Semana {}: {}\nAún no hay fichas disponibles para esta semana.",
            week,
            calendar::week_range_label(course.start_date, week)
        );
    }
    controls.push(vec![Control::new(
        "🔙 Regresar a Selección de Semanas",
        TOKEN_BACK_WEEKS,
    )]);

    ScreenView { text, controls }
}

/// Shown after a document send attempt; the screen stays on the week.
pub fn after_document(week: u32) -> ScreenView {
    ScreenView {
        text: "Selecciona otra asignatura o regresa:".to_string(),
        controls: vec![vec![Control::new(
            "🔙 Regresar a Asignaturas",
            subjects_back_token(week),
        )]],
    }
}

pub fn announcements(store: &AnnouncementStore) -> ScreenView {
    ScreenView {
        text: format!("📢 Comunicados:\n\n{}", store.read()),
        controls: vec![back_to_menu()],
    }
}

pub fn evaluations() -> ScreenView {
    ScreenView {
        text: "📝 Evaluaciones: próximamente añadiremos el detalle por semana.".to_string(),
        controls: vec![back_to_menu()],
    }
}

pub fn chat_panel(notice: &str) -> ScreenView {
    ScreenView {
        text: notice.to_string(),
        controls: vec![
            vec![Control::new("✍️ Hacer una pregunta", TOKEN_TUTOR_ASK)],
            vec![Control::new("🧹 Borrar historial", TOKEN_TUTOR_RESET)],
            vec![Control::new("🔙 Salir del tutor", TOKEN_TUTOR_EXIT)],
        ],
    }
}

/// Caption attached to a sent document.
pub fn document_caption(course: &CourseConfig, week: u32, subject: Subject) -> String {
    format!(
        "📄 Ficha Pedagógica\nSemana {} · {}\n{}\nCurso: {}",
        week,
        subject.label(),
        calendar::week_range_label(course.start_date, week),
        calendar::course_label(course.grade, &course.section)
    )
}

/// Message shown when a document resolves to absent.
pub fn document_missing_text(week: u32, subject: Subject) -> String {
    format!(
        "⚠️ No se encontró el PDF para:\nSemana {} · {}",
        week,
        subject.label()
    )
}

/// Renders any screen. The chat panel uses its default notice; handlers
/// that want a different notice call [`chat_panel`] directly.
pub fn render(
    screen: &Screen,
    course: &CourseConfig,
    docs: &DocumentStore,
    announcements_store: &AnnouncementStore,
) -> ScreenView {
    match screen {
        Screen::MainMenu => main_menu(),
        Screen::WeekList => week_list(course),
        Screen::SubjectList { week } => subject_list(course, docs, *week),
        Screen::Announcements => announcements(announcements_store),
        Screen::Evaluations => evaluations(),
        Screen::ChatPanel => chat_panel(CHAT_WELCOME),
    }
}
