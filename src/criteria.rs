use crate::error::RustyFieldError;
use glob::Pattern;

/// Options steering reconstruction, naming and field listing.
#[derive(Clone, Debug)]
pub struct Criteria {
    /// Largest difference, in host units, between two measurements considered equal.
    pub tolerance: u32,

    /// Length of generated names for cells without any header.
    pub random_name_length: usize,

    /// Rows treated as the `head` band by structured naming.
    pub header_rows: usize,

    /// Rows treated as the `foot` band by structured naming.
    pub footer_rows: usize,

    /// Caption used when the table has none (default: "TBL").
    pub caption_fallback: String,

    /// Field name patterns for filtering field listings.
    pub field_patterns: Option<Vec<Pattern>>,
}

impl Criteria {
    /// Default clustering tolerance in host units.
    pub const DEFAULT_TOLERANCE: u32 = 50;

    /// Compiles glob patterns used by [`Criteria::accept`].
    pub fn with_field_patterns(mut self, patterns: &[&str]) -> Result<Self, RustyFieldError> {
        let patterns = patterns
            .iter()
            .map(|pattern| Pattern::new(pattern))
            .collect::<Result<Vec<Pattern>, _>>()?;
        self.field_patterns = Some(patterns);
        Ok(self)
    }

    /// Checks if a field name matches the criteria patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub fn accept(&self, field_name: &str) -> bool {
        if let Some(patterns) = &self.field_patterns {
            patterns.iter().any(|pattern| pattern.matches(field_name))
        } else {
            true
        }
    }
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria {
            tolerance: Self::DEFAULT_TOLERANCE,
            random_name_length: 12,
            header_rows: 1,
            footer_rows: 0,
            caption_fallback: "TBL".to_owned(),
            field_patterns: None,
        }
    }
}
