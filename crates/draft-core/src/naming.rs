//! Archive entry names.

use std::collections::{HashMap, HashSet};

use draft_model::{BatchOptions, RenderContext};
use draft_transform::sanitize_filename;

/// Base name for a row: the sanitized identity value, or the positional
/// `<fallback>_<row number>` when the row has no identity column at all.
///
/// A present but blank identity value sanitizes to the fallback label.
pub fn identity_label(row_index: usize, context: &RenderContext, options: &BatchOptions) -> String {
    let max_len = options.effective_max_filename_len();
    match context.get(&options.identity_column) {
        Some(value) => sanitize_filename(Some(value), &options.fallback_label, max_len),
        None => {
            let positional = format!("{}_{}", options.fallback_label.trim(), row_index + 1);
            sanitize_filename(Some(&positional), &options.fallback_label, max_len)
        }
    }
}

/// Hands out unique entry names for one batch.
///
/// The first use of a base gets `<base><ext>`; later uses get `<base>_2<ext>`,
/// `<base>_3<ext>` and so on. Names are compared ASCII case-insensitively, and
/// a suffixed name that is already taken is skipped.
#[derive(Debug, Default)]
pub struct FilenameAllocator {
    extension: String,
    used: HashSet<String>,
    next_suffix: HashMap<String, usize>,
}

impl FilenameAllocator {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..Self::default()
        }
    }

    pub fn allocate(&mut self, base: &str) -> String {
        let base_key = base.to_ascii_lowercase();
        let candidate = format!("{base}{}", self.extension);
        if self.used.insert(candidate.to_ascii_lowercase()) {
            return candidate;
        }

        let counter = self.next_suffix.entry(base_key).or_insert(2);
        loop {
            let candidate = format!("{base}_{counter}{}", self.extension);
            *counter += 1;
            if self.used.insert(candidate.to_ascii_lowercase()) {
                return candidate;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_get_numeric_suffixes() {
        let mut names = FilenameAllocator::new(".docx");
        assert_eq!(names.allocate("acme"), "acme.docx");
        assert_eq!(names.allocate("acme"), "acme_2.docx");
        assert_eq!(names.allocate("acme"), "acme_3.docx");
        assert_eq!(names.allocate("globex"), "globex.docx");
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn comparison_ignores_ascii_case() {
        let mut names = FilenameAllocator::new(".docx");
        assert_eq!(names.allocate("Acme"), "Acme.docx");
        assert_eq!(names.allocate("ACME"), "ACME_2.docx");
    }

    #[test]
    fn suffix_skips_names_taken_naturally() {
        let mut names = FilenameAllocator::new(".docx");
        assert_eq!(names.allocate("acme"), "acme.docx");
        assert_eq!(names.allocate("acme_2"), "acme_2.docx");
        assert_eq!(names.allocate("acme"), "acme_3.docx");
        assert_eq!(names.allocate("acme_2"), "acme_2_2.docx");
    }

    #[test]
    fn identity_label_prefers_identity_column() {
        let options = BatchOptions::default();
        let context: RenderContext = [("contract_id", " C/001 ")].into_iter().collect();
        assert_eq!(identity_label(0, &context, &options), "C_001");
    }

    #[test]
    fn blank_identity_uses_fallback_label() {
        let options = BatchOptions::default();
        let context: RenderContext = [("contract_id", "")].into_iter().collect();
        assert_eq!(identity_label(4, &context, &options), "contract");
    }

    #[test]
    fn absent_identity_column_is_positional() {
        let options = BatchOptions::default();
        let context: RenderContext = [("party", "Acme")].into_iter().collect();
        assert_eq!(identity_label(4, &context, &options), "contract_5");

        let options = BatchOptions::default().with_identity_column("deal_ref");
        let context: RenderContext = [("contract_id", "C-1")].into_iter().collect();
        assert_eq!(identity_label(0, &context, &options), "contract_1");
    }
}
