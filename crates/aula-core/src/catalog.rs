//! The fixed subject catalog for the course.
//!
//! Subjects are a closed set: every callback token, menu control and
//! document lookup refers to one of these keys.

/// A course subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Electricidad,
    Tren,
    Sistemas,
    Motores,
}

impl Subject {
    /// Returns all subjects in menu order.
    pub fn all() -> &'static [Subject] {
        &[
            Subject::Electricidad,
            Subject::Tren,
            Subject::Sistemas,
            Subject::Motores,
        ]
    }

    /// Returns the short key used in callback tokens and filenames.
    pub fn key(&self) -> &'static str {
        match self {
            Subject::Electricidad => "electricidad",
            Subject::Tren => "tren",
            Subject::Sistemas => "sistemas",
            Subject::Motores => "motores",
        }
    }

    /// Returns the display name shown on menu controls and captions.
    pub fn label(&self) -> &'static str {
        match self {
            Subject::Electricidad => "Electricidad, Electromagnetismo y Electrónica",
            Subject::Tren => "Tren de Rodaje",
            Subject::Sistemas => "Sistemas Eléctricos y Electrónicos",
            Subject::Motores => "Motores de Combustión Interna",
        }
    }

    /// Returns the undecorated document filename expected in each week folder.
    pub fn base_filename(&self) -> &'static str {
        match self {
            Subject::Electricidad => "electricidad_electromagnetismo.pdf",
            Subject::Tren => "tren_de_rodaje.pdf",
            Subject::Sistemas => "sistemas_electricos_y_electronicos.pdf",
            Subject::Motores => "motores_combustion_interna.pdf",
        }
    }

    /// Returns the subject for a catalog key, if it is one of the closed set.
    pub fn from_key(key: &str) -> Option<Subject> {
        Subject::all()
            .iter()
            .copied()
            .find(|subject| subject.key() == key)
    }
}
