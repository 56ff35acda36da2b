//! Shared "current answer" cell

use std::sync::atomic::{AtomicU8, Ordering};
use triviacore::protocol::ANSWER_LETTERS;

/// Last-writer-wins holder for the player's current choice
///
/// Written by the input listener, read by the session when a round closes.
/// Whatever value is stored at that moment is what gets submitted.
#[derive(Debug)]
pub struct AnswerCell {
    letter: AtomicU8,
}

impl AnswerCell {
    pub fn new() -> Self {
        Self {
            letter: AtomicU8::new(b'A'),
        }
    }

    /// Turn user input into an upper-case option letter
    ///
    /// Accepts exactly one of a-d / A-D, surrounding whitespace ignored.
    pub fn parse_choice(input: &str) -> Option<char> {
        let mut chars = input.trim().chars();
        let choice = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() || !ANSWER_LETTERS.contains(&choice) {
            return None;
        }
        Some(choice)
    }

    /// Store a choice if valid; invalid input leaves the cell unchanged
    pub fn set(&self, input: &str) -> bool {
        match Self::parse_choice(input) {
            Some(letter) => {
                self.letter.store(letter as u8, Ordering::Release);
                true
            }
            None => false,
        }
    }

    pub fn get(&self) -> char {
        self.letter.load(Ordering::Acquire) as char
    }
}

impl Default for AnswerCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_a() {
        assert_eq!(AnswerCell::new().get(), 'A');
    }

    #[test]
    fn test_accepts_either_case() {
        let cell = AnswerCell::new();
        assert!(cell.set("c"));
        assert_eq!(cell.get(), 'C');
        assert!(cell.set(" D\n"));
        assert_eq!(cell.get(), 'D');
    }

    #[test]
    fn test_invalid_input_keeps_previous() {
        let cell = AnswerCell::new();
        cell.set("b");

        for bad in ["e", "ab", "", "1", "bb", "é"] {
            assert!(!cell.set(bad), "accepted {:?}", bad);
        }
        assert_eq!(cell.get(), 'B');
    }

    #[test]
    fn test_last_write_wins() {
        let cell = AnswerCell::new();
        cell.set("a");
        cell.set("d");
        cell.set("c");
        assert_eq!(cell.get(), 'C');
    }
}
