//! Case- and whitespace-insensitive word comparison.
//!
//! Two records count as duplicates when their populated translations match
//! as an unordered set. A record with only `{ru, en}` filled is not a
//! duplicate of one with all three filled even if `ru`/`en` agree: the
//! value counts differ. Records with fewer than two populated slots are
//! never comparable at all.

use std::collections::HashSet;

use crate::words::record::WordRecord;

/// Lower-cased, trimmed projection of the three translation slots. Derived
/// on demand for equality checks, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedWord {
    pub ru: String,
    pub en: String,
    pub ko: String,
}

fn field_value(main: &str, mirror: &str) -> String {
    let raw = if main.is_empty() { mirror } else { main };
    raw.trim().to_lowercase()
}

pub fn normalize(word: &WordRecord) -> NormalizedWord {
    NormalizedWord {
        ru: field_value(&word.ru, &word.translations.ru),
        en: field_value(&word.en, &word.translations.en),
        ko: field_value(&word.ko, &word.translations.ko),
    }
}

/// Normalize a loose `(ru, en, ko)` triple, e.g. from an import batch where
/// the flat fields may be missing.
pub fn normalize_parts(ru: &str, en: &str, ko: &str) -> NormalizedWord {
    NormalizedWord {
        ru: ru.trim().to_lowercase(),
        en: en.trim().to_lowercase(),
        ko: ko.trim().to_lowercase(),
    }
}

impl NormalizedWord {
    fn non_empty_sorted(&self) -> Vec<&str> {
        let mut values: Vec<&str> = [&self.ru, &self.en, &self.ko]
            .into_iter()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect();
        values.sort_unstable();
        values
    }

    /// Stable identity of the populated value set, used to dedupe a batch
    /// against itself. Empty when the record is fully blank.
    pub fn dedupe_key(&self) -> String {
        self.non_empty_sorted().join("|")
    }
}

pub fn words_are_equal(a: &NormalizedWord, b: &NormalizedWord) -> bool {
    let values_a = a.non_empty_sorted();
    let values_b = b.non_empty_sorted();

    if values_a.len() != values_b.len() || values_a.len() < 2 {
        return false;
    }

    values_a == values_b
}

/// Drop batch entries that duplicate an existing word or an earlier entry
/// in the same batch (first occurrence wins). Fully blank entries are
/// dropped outright; they are never treated as mutual duplicates.
pub fn filter_duplicates<T, F>(incoming: Vec<T>, existing: &[NormalizedWord], norm: F) -> Vec<T>
where
    F: Fn(&T) -> NormalizedWord,
{
    let mut unique = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for item in incoming {
        let normalized = norm(&item);
        let key = normalized.dedupe_key();

        if key.is_empty() {
            continue;
        }
        if seen.contains(&key) {
            continue;
        }

        let is_duplicate = existing.iter().any(|e| words_are_equal(&normalized, e));
        if !is_duplicate {
            seen.insert(key);
            unique.push(item);
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::record::Translations;

    fn word(ru: &str, en: &str, ko: &str) -> WordRecord {
        let mut w = WordRecord {
            id: "w".to_string(),
            ru: ru.to_string(),
            en: en.to_string(),
            ko: ko.to_string(),
            translations: Translations::default(),
            user_id: None,
            created_at: None,
        };
        w.sync_mirror();
        w
    }

    #[test]
    fn test_normalize_trims_and_lowercases() {
        let n = normalize(&word("  КоТ ", " Cat", "고양이 "));
        assert_eq!(n.ru, "кот");
        assert_eq!(n.en, "cat");
        assert_eq!(n.ko, "고양이");
    }

    #[test]
    fn test_normalize_falls_back_to_mirror() {
        let w = WordRecord {
            id: "w".to_string(),
            ru: String::new(),
            en: String::new(),
            ko: String::new(),
            translations: Translations {
                ru: "Кот".to_string(),
                en: "cat".to_string(),
                ko: String::new(),
            },
            user_id: None,
            created_at: None,
        };
        let n = normalize(&w);
        assert_eq!(n.ru, "кот");
        assert_eq!(n.en, "cat");
        assert_eq!(n.ko, "");
    }

    #[test]
    fn test_equal_ignores_slot_assignment() {
        // Same value set in different slots still matches.
        let a = normalize_parts("кот", "cat", "");
        let b = normalize_parts("cat", "кот", "");
        assert!(words_are_equal(&a, &b));
    }

    #[test]
    fn test_equal_ignores_case_and_whitespace() {
        let a = normalize_parts(" Кот ", "CAT", "");
        let b = normalize_parts("кот", "cat", "");
        assert!(words_are_equal(&a, &b));
    }

    #[test]
    fn test_differing_value_counts_are_not_equal() {
        let two = normalize_parts("кот", "cat", "");
        let three = normalize_parts("кот", "cat", "고양이");
        assert!(!words_are_equal(&two, &three));
    }

    #[test]
    fn test_fewer_than_two_values_never_equal() {
        let a = normalize_parts("кот", "", "");
        let b = normalize_parts("кот", "", "");
        assert!(!words_are_equal(&a, &b));

        let blank = normalize_parts("", "", "");
        assert!(!words_are_equal(&blank, &blank.clone()));
    }

    #[test]
    fn test_filter_keeps_first_occurrence() {
        let batch = vec![
            word("кот", "cat", ""),
            word("Cat", "КОТ", ""), // same value set, different slots/case
            word("пёс", "dog", ""),
        ];
        let kept = filter_duplicates(batch, &[], normalize);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].ru, "кот");
        assert_eq!(kept[1].ru, "пёс");
    }

    #[test]
    fn test_filter_rejects_against_existing() {
        let existing = vec![normalize(&word("кот", "cat", ""))];
        let batch = vec![word(" КОТ", "Cat ", ""), word("пёс", "dog", "")];
        let kept = filter_duplicates(batch, &existing, normalize);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].en, "dog");
    }

    #[test]
    fn test_filter_skips_blank_entries() {
        let batch = vec![word("", "", ""), word("", "  ", ""), word("кот", "cat", "")];
        let kept = filter_duplicates(batch, &[], normalize);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_single_field_entries_pass_the_filter() {
        // One-field records are below the comparability threshold, so two
        // identical ones both survive against existing words...
        let existing = vec![normalize(&word("кот", "", ""))];
        let batch = vec![word("кот", "", "")];
        let kept = filter_duplicates(batch, &existing, normalize);
        assert_eq!(kept.len(), 1);

        // ...but the batch-local key still collapses exact repeats.
        let batch = vec![word("кот", "", ""), word("кот", "", "")];
        let kept = filter_duplicates(batch, &[], normalize);
        assert_eq!(kept.len(), 1);
    }
}
