//! Week date arithmetic and Spanish date-range labels.
//!
//! Week 1 starts on the configured course start date (a Monday) and each
//! week spans Monday through Friday.

use chrono::{Datelike, Days, NaiveDate};

const MONTHS_FULL: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

const MONTHS_SHORT: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

fn month_full(date: NaiveDate) -> &'static str {
    MONTHS_FULL[date.month0() as usize]
}

fn month_short(date: NaiveDate) -> &'static str {
    MONTHS_SHORT[date.month0() as usize]
}

/// Returns the Monday and Friday of week `week` (1-indexed).
pub fn week_range(start: NaiveDate, week: u32) -> (NaiveDate, NaiveDate) {
    let first = start + Days::new(u64::from(week - 1) * 7);
    let last = first + Days::new(4);
    (first, last)
}

/// Full date-range label, e.g. `Del 4 al 8 de Agosto de 2025` or
/// `Del 28 de Julio al 1 de Agosto de 2025` when the week crosses a month.
pub fn week_range_label(start: NaiveDate, week: u32) -> String {
    let (first, last) = week_range(start, week);
    if first.month() == last.month() {
        format!(
            "Del {} al {} de {} de {}",
            first.day(),
            last.day(),
            month_full(last),
            last.year()
        )
    } else {
        format!(
            "Del {} de {} al {} de {} de {}",
            first.day(),
            month_full(first),
            last.day(),
            month_full(last),
            last.year()
        )
    }
}

/// Abbreviated range label for week-list controls, e.g. `28 Jul–1 Ago`.
pub fn week_range_short(start: NaiveDate, week: u32) -> String {
    let (first, last) = week_range(start, week);
    format!(
        "{} {}–{} {}",
        first.day(),
        month_short(first),
        last.day(),
        month_short(last)
    )
}

/// Header shown above the subject list for a week.
pub fn week_header(start: NaiveDate, week: u32) -> String {
    format!(
        "Semana {}: {}\nSeleccione la asignatura:",
        week,
        week_range_label(start, week)
    )
}

/// Course identity label, e.g. `2º B`.
pub fn course_label(grade: u8, section: &str) -> String {
    format!("{grade}º {section}")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{course_label, week_header, week_range, week_range_label, week_range_short};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 28).unwrap()
    }

    #[test]
    fn week_one_spans_monday_to_friday() {
        let (first, last) = week_range(start(), 1);
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 7, 28).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
    }

    #[test]
    fn cross_month_label_names_both_months() {
        assert_eq!(
            week_range_label(start(), 1),
            "Del 28 de Julio al 1 de Agosto de 2025"
        );
    }

    #[test]
    fn same_month_label_names_month_once() {
        assert_eq!(week_range_label(start(), 2), "Del 4 al 8 de Agosto de 2025");
    }

    #[test]
    fn short_label_uses_abbreviated_months() {
        assert_eq!(week_range_short(start(), 1), "28 Jul–1 Ago");
        assert_eq!(week_range_short(start(), 3), "11 Ago–15 Ago");
    }

    #[test]
    fn header_includes_week_number_and_range() {
        let header = week_header(start(), 2);
        assert!(header.starts_with("Semana 2: Del 4 al 8 de Agosto de 2025"));
        assert!(header.ends_with("Seleccione la asignatura:"));
    }

    #[test]
    fn course_label_format() {
        assert_eq!(course_label(2, "B"), "2º B");
    }
}
