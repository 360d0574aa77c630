//! Repair sweeps over a stored collection: collapse accidental id
//! duplicates, and an explicit "remove duplicates" pass using normalized
//! equality. Both keep the first occurrence's position in the list.

use std::collections::{HashMap, HashSet};

use crate::words::normalize::normalize;
use crate::words::record::WordRecord;

/// Collapse entries sharing an id. Order follows the first occurrence;
/// the value is the last write for that id.
pub fn dedupe_by_id(words: &[WordRecord]) -> Vec<WordRecord> {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &WordRecord> = HashMap::new();

    for word in words {
        if !latest.contains_key(word.id.as_str()) {
            order.push(&word.id);
        }
        latest.insert(&word.id, word);
    }

    order
        .into_iter()
        .map(|id| latest[id].clone())
        .collect()
}

/// Drop later entries whose populated translation set matches an earlier
/// entry (the same rule the add path enforces). Entries below the two-field
/// comparability threshold are always kept.
pub fn remove_normalized_duplicates(words: &[WordRecord]) -> Vec<WordRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::new();

    for word in words {
        let normalized = normalize(word);
        let key = normalized.dedupe_key();
        if key.split('|').count() < 2 || key.is_empty() {
            kept.push(word.clone());
            continue;
        }
        if seen.insert(key) {
            kept.push(word.clone());
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::record::Translations;

    fn word(id: &str, ru: &str, en: &str) -> WordRecord {
        let mut w = WordRecord {
            id: id.to_string(),
            ru: ru.to_string(),
            en: en.to_string(),
            ko: String::new(),
            translations: Translations::default(),
            user_id: None,
            created_at: None,
        };
        w.sync_mirror();
        w
    }

    #[test]
    fn test_dedupe_by_id_keeps_first_position_last_value() {
        let words = vec![
            word("a", "кот", "cat"),
            word("b", "пёс", "dog"),
            word("a", "кот", "cat-v2"),
        ];
        let deduped = dedupe_by_id(&words);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].id, "a");
        assert_eq!(deduped[0].en, "cat-v2");
        assert_eq!(deduped[1].id, "b");
    }

    #[test]
    fn test_dedupe_by_id_no_duplicates_is_identity() {
        let words = vec![word("a", "кот", "cat"), word("b", "пёс", "dog")];
        assert_eq!(dedupe_by_id(&words), words);
    }

    #[test]
    fn test_normalized_sweep_first_occurrence_wins() {
        let words = vec![
            word("a", "кот", "cat"),
            word("b", "Cat", "КОТ"),
            word("c", "пёс", "dog"),
        ];
        let kept = remove_normalized_duplicates(&words);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].id, "a");
        assert_eq!(kept[1].id, "c");
    }

    #[test]
    fn test_normalized_sweep_keeps_blank_and_single_field_entries() {
        let words = vec![
            word("a", "", ""),
            word("b", "", ""),
            word("c", "кот", ""),
            word("d", "кот", ""),
        ];
        assert_eq!(remove_normalized_duplicates(&words).len(), 4);
    }
}
