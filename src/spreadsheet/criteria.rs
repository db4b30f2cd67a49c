use crate::error::ChartError;
use glob::MatchOptions;
use glob::Pattern;

/// Selects sheets of a workbook by name.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// Sheet name patterns; `None` accepts every sheet.
    pub sheet_name_patterns: Option<Vec<Pattern>>,

    /// Whether patterns match case-sensitively.
    pub case_sensitive: bool,
}

impl Criteria {
    /// Accepts every sheet.
    pub fn all() -> Self {
        Self::default()
    }

    /// Accepts sheets whose names begin with `prefix`, ignoring case.
    pub fn name_prefix(prefix: &str) -> Result<Self, ChartError> {
        let pattern = Pattern::new(&format!("{}*", Pattern::escape(prefix)))?;
        Ok(Criteria {
            sheet_name_patterns: Some(vec![pattern]),
            case_sensitive: false,
        })
    }

    /// Returns true if no patterns are specified or if name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: self.case_sensitive,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        match &self.sheet_name_patterns {
            Some(patterns) => patterns
                .iter()
                .any(|pattern| pattern.matches_with(sheet_name, options)),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_ignores_case() {
        let criteria = Criteria::name_prefix("module").unwrap();
        assert!(criteria.accept("Module 1"));
        assert!(criteria.accept("MODULE2 charts"));
        assert!(criteria.accept("module"));
        assert!(!criteria.accept("Overview"));
        assert!(!criteria.accept(" Module 3"));
    }

    #[test]
    fn prefix_is_literal() {
        let criteria = Criteria::name_prefix("[a]").unwrap();
        assert!(criteria.accept("[A] sheet"));
        assert!(!criteria.accept("a sheet"));
    }

    #[test]
    fn all_accepts_everything() {
        assert!(Criteria::all().accept("anything"));
    }
}
