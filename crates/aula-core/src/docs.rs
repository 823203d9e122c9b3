//! Week document resolution.
//!
//! Week folders live on a case-sensitive filesystem while the documents
//! are uploaded by hand, so the section letter and the week marker show
//! up in either case. Resolution probes a fixed candidate order and falls
//! back to the undecorated base name; a missing document is "absent",
//! never an error.

use std::path::PathBuf;

use crate::catalog::Subject;
use crate::config::CourseConfig;

/// Read-only lookup of week documents by (week, subject).
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
    grade: u8,
    section: String,
    with_suffix: bool,
}

impl DocumentStore {
    pub fn new(
        root: impl Into<PathBuf>,
        grade: u8,
        section: impl Into<String>,
        with_suffix: bool,
    ) -> Self {
        Self {
            root: root.into(),
            grade,
            section: section.into(),
            with_suffix,
        }
    }

    pub fn from_config(course: &CourseConfig) -> Self {
        Self::new(
            course.materials_dir.clone(),
            course.grade,
            course.section.clone(),
            course.with_suffix,
        )
    }

    fn week_dir(&self, week: u32) -> PathBuf {
        self.root.join(format!("semana{week}"))
    }

    /// Returns the suffixed filename candidates in probe order: the
    /// configured section letter, then upper-case, then lower-case, each
    /// with an upper- and lower-case week marker. The undecorated base
    /// name is the fallback and is not part of this list.
    pub fn candidates(&self, week: u32, subject: Subject) -> Vec<String> {
        if !self.with_suffix {
            return Vec::new();
        }

        let base = subject.base_filename();
        let stem = if base.to_lowercase().ends_with(".pdf") {
            &base[..base.len() - 4]
        } else {
            base
        };

        let letters = [
            self.section.clone(),
            self.section.to_uppercase(),
            self.section.to_lowercase(),
        ];

        let mut names = Vec::with_capacity(letters.len() * 2);
        for letter in &letters {
            names.push(format!("{stem}_{}{letter}_S{week}.pdf", self.grade));
            names.push(format!("{stem}_{}{letter}_s{week}.pdf", self.grade));
        }
        names
    }

    /// Resolves the document path for (week, subject). First existing
    /// candidate wins; `None` means absent.
    pub fn resolve(&self, week: u32, subject: Subject) -> Option<PathBuf> {
        let dir = self.week_dir(week);

        for name in self.candidates(week, subject) {
            let path = dir.join(name);
            if path.is_file() {
                return Some(path);
            }
        }

        let fallback = dir.join(subject.base_filename());
        fallback.is_file().then_some(fallback)
    }

    /// Whether the subject has a document for the week. Drives whether
    /// the subject's menu control is shown at all.
    pub fn available(&self, week: u32, subject: Subject) -> bool {
        self.resolve(week, subject).is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::DocumentStore;
    use crate::catalog::Subject;

    fn store(root: &std::path::Path) -> DocumentStore {
        DocumentStore::new(root, 2, "B", true)
    }

    #[test]
    fn candidate_order_matches_section_case_variants() {
        let dir = tempfile::tempdir().unwrap();
        let names = store(dir.path()).candidates(3, Subject::Motores);
        assert_eq!(
            names,
            vec![
                "motores_combustion_interna_2B_S3.pdf",
                "motores_combustion_interna_2B_s3.pdf",
                "motores_combustion_interna_2B_S3.pdf",
                "motores_combustion_interna_2B_s3.pdf",
                "motores_combustion_interna_2b_S3.pdf",
                "motores_combustion_interna_2b_s3.pdf",
            ]
        );
    }

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let week_dir = dir.path().join("semana3");
        fs::create_dir_all(&week_dir).unwrap();
        fs::write(week_dir.join("motores_combustion_interna_2B_S3.pdf"), b"pdf").unwrap();
        fs::write(week_dir.join("motores_combustion_interna_2b_s3.pdf"), b"pdf").unwrap();

        let resolved = store(dir.path()).resolve(3, Subject::Motores).unwrap();
        assert_eq!(
            resolved.file_name().unwrap(),
            "motores_combustion_interna_2B_S3.pdf"
        );
    }

    #[test]
    fn lower_case_variant_is_found() {
        let dir = tempfile::tempdir().unwrap();
        let week_dir = dir.path().join("semana3");
        fs::create_dir_all(&week_dir).unwrap();
        fs::write(week_dir.join("motores_combustion_interna_2b_s3.pdf"), b"pdf").unwrap();

        let resolved = store(dir.path()).resolve(3, Subject::Motores).unwrap();
        assert_eq!(
            resolved.file_name().unwrap(),
            "motores_combustion_interna_2b_s3.pdf"
        );
    }

    #[test]
    fn falls_back_to_undecorated_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let week_dir = dir.path().join("semana1");
        fs::create_dir_all(&week_dir).unwrap();
        fs::write(week_dir.join("tren_de_rodaje.pdf"), b"pdf").unwrap();

        let resolved = store(dir.path()).resolve(1, Subject::Tren).unwrap();
        assert_eq!(resolved.file_name().unwrap(), "tren_de_rodaje.pdf");
    }

    #[test]
    fn absent_document_is_none_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("semana2")).unwrap();

        let store = store(dir.path());
        assert_eq!(store.resolve(2, Subject::Sistemas), None);
        assert!(!store.available(2, Subject::Sistemas));
        // Missing week folder entirely is also just absent.
        assert_eq!(store.resolve(6, Subject::Sistemas), None);
    }

    #[test]
    fn suffixless_store_probes_only_the_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let week_dir = dir.path().join("semana1");
        fs::create_dir_all(&week_dir).unwrap();
        fs::write(week_dir.join("electricidad_electromagnetismo.pdf"), b"pdf").unwrap();

        let store = DocumentStore::new(dir.path(), 2, "B", false);
        assert!(store.candidates(1, Subject::Electricidad).is_empty());
        assert!(store.available(1, Subject::Electricidad));
    }
}
