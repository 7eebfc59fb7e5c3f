//! Business logic services
//!
//! Services enforce the studio's rules and coordinate repositories,
//! converting records into the response types of the shared crate.

pub mod evaluations;
pub mod evolution;
pub mod export;
pub mod instructors;
pub mod reports;
pub mod schedules;
pub mod students;

pub use evaluations::EvaluationService;
pub use evolution::EvolutionService;
pub use export::ExportService;
pub use instructors::InstructorService;
pub use reports::ReportService;
pub use schedules::ScheduleService;
pub use students::StudentService;

/// Trim a search term; blank terms mean "no filter"
pub(crate) fn normalize_search(search: Option<String>) -> Option<String> {
    trimmed(search)
}

/// Trim optional free text, mapping blank strings to `None`
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Drop blank entries from a free-text list
pub(crate) fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed() {
        assert_eq!(trimmed(Some("  Sala 2 ".to_string())), Some("Sala 2".to_string()));
        assert_eq!(trimmed(Some("   ".to_string())), None);
        assert_eq!(trimmed(None), None);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Ana@Studio.COM "), "ana@studio.com");
    }

    #[test]
    fn test_clean_list() {
        let items = vec![" Reformer ".to_string(), "".to_string(), "Cadillac".to_string()];
        assert_eq!(clean_list(items), vec!["Reformer", "Cadillac"]);
    }
}
