//! Repeat-until-mastered drill.
//!
//! A pass starts from a random permutation of the full word set. A correct
//! answer retires the word; a miss rotates it to the back of the queue, so
//! it comes around again only after every other queued word has had another
//! turn. The pass completes once every word in the set has been answered
//! correctly at least once, which also guarantees termination.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::words::record::WordRecord;

#[derive(Clone, Debug, Default)]
pub struct RepeatState {
    pub words_queue: Vec<WordRecord>,
    pub current_index: usize,
    pub correct_words: HashSet<String>,
    pub incorrect_count: u32,
    pub is_completed: bool,
    fingerprint: String,
}

/// Identity of a word set by its id list; a change forces a drill restart.
pub fn word_set_fingerprint(words: &[WordRecord]) -> String {
    words
        .iter()
        .map(|w| w.id.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

impl RepeatState {
    pub fn new<R: Rng>(words: &[WordRecord], rng: &mut R) -> Self {
        let mut queue = words.to_vec();
        queue.shuffle(rng);
        Self {
            words_queue: queue,
            current_index: 0,
            correct_words: HashSet::new(),
            incorrect_count: 0,
            is_completed: false,
            fingerprint: word_set_fingerprint(words),
        }
    }

    pub fn reset<R: Rng>(&mut self, words: &[WordRecord], rng: &mut R) {
        *self = Self::new(words, rng);
    }

    /// Re-initialize when the underlying word set changed (by id list).
    /// Returns true if a restart happened.
    pub fn refresh_if_changed<R: Rng>(&mut self, words: &[WordRecord], rng: &mut R) -> bool {
        if self.fingerprint == word_set_fingerprint(words) {
            return false;
        }
        self.reset(words, rng);
        true
    }

    pub fn current(&self) -> Option<&WordRecord> {
        self.words_queue.get(self.current_index)
    }

    /// Record a correct answer for the current word. Returns true when the
    /// pass is complete. The pointer does not advance: the next word slides
    /// into the freed slot (wrapping to 0 past the shrunk end).
    pub fn mark_correct<R: Rng>(&mut self, all_words: &[WordRecord], rng: &mut R) -> bool {
        let Some(current) = self.current() else {
            return self.is_completed;
        };
        let current_id = current.id.clone();
        self.correct_words.insert(current_id.clone());

        if self.correct_words.len() >= all_words.len() {
            self.is_completed = true;
            return true;
        }

        self.words_queue.retain(|w| w.id != current_id);

        if self.words_queue.is_empty() {
            // Only reachable when the full set changed mid-pass: rebuild
            // from whatever is still unanswered.
            let mut remaining: Vec<WordRecord> = all_words
                .iter()
                .filter(|w| !self.correct_words.contains(&w.id))
                .cloned()
                .collect();
            if remaining.is_empty() {
                self.is_completed = true;
                return true;
            }
            remaining.shuffle(rng);
            self.words_queue = remaining;
            self.current_index = 0;
            return false;
        }

        if self.current_index >= self.words_queue.len() {
            self.current_index = 0;
        }
        false
    }

    /// Record a miss: the current word rotates to the back of the queue and
    /// recurs after one full remaining pass.
    pub fn mark_incorrect(&mut self) {
        if self.words_queue.is_empty() {
            return;
        }
        let missed = self.words_queue.remove(self.current_index);
        self.words_queue.push(missed);

        if self.current_index >= self.words_queue.len() - 1 {
            self.current_index = 0;
        }
        self.incorrect_count += 1;
    }

    /// Replace an edited word in place, then advance one card so the same
    /// (now-changed) card is not shown again immediately.
    pub fn apply_word_update(&mut self, updated: &WordRecord) {
        for word in &mut self.words_queue {
            if word.id == updated.id {
                *word = updated.clone();
            }
        }

        if self.words_queue.is_empty() {
            self.is_completed = true;
            return;
        }

        if self.current_index >= self.words_queue.len() - 1 {
            self.current_index = 0;
        } else {
            self.current_index += 1;
        }
    }
}
