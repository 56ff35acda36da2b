//! Question bank loading
//!
//! The bank is a JSON array consumed in file order, one entry per round:
//!
//! ```json
//! [{"question": "2 + 2?", "A": "3", "B": "4", "C": "5", "D": "22", "answer": "B"}]
//! ```

use crate::error::SetupError;
use serde::Deserialize;
use std::path::Path;
use triviacore::protocol::ANSWER_LETTERS;

/// On-disk shape of one bank entry
#[derive(Debug, Deserialize)]
struct QuestionRecord {
    question: String,
    #[serde(rename = "A")]
    a: String,
    #[serde(rename = "B")]
    b: String,
    #[serde(rename = "C")]
    c: String,
    #[serde(rename = "D")]
    d: String,
    answer: String,
}

/// A question with four labelled options and its canonical answer letter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub options: [String; 4],
    /// Upper-case option letter
    pub answer: String,
}

impl Question {
    pub fn new(text: impl Into<String>, options: [&str; 4], answer: &str) -> Self {
        Self {
            text: text.into(),
            options: options.map(str::to_string),
            answer: answer.trim().to_uppercase(),
        }
    }

    /// Text broadcast with the QUESTION message
    pub fn format(&self) -> String {
        let mut out = format!("Question: {}", self.text);
        for (letter, option) in ANSWER_LETTERS.iter().zip(&self.options) {
            out.push_str(&format!("\n{}: {}", letter, option));
        }
        out
    }

    /// Exact match against the canonical letter
    pub fn is_correct(&self, submitted: &str) -> bool {
        submitted == self.answer
    }
}

/// Ordered, immutable list of questions
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Load and validate a bank from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SetupError::QuestionFile {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<QuestionRecord> =
            serde_json::from_str(&content).map_err(|source| SetupError::QuestionFormat {
                path: path.to_path_buf(),
                source,
            })?;

        let bank = Self::from_records(records)?;
        tracing::info!("Loaded {} questions from {}", bank.len(), path.display());
        Ok(bank)
    }

    fn from_records(records: Vec<QuestionRecord>) -> Result<Self, SetupError> {
        let mut questions = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let answer = record.answer.trim().to_uppercase();
            let valid = answer.len() == 1 && answer.chars().all(|c| ANSWER_LETTERS.contains(&c));
            if !valid {
                return Err(SetupError::InvalidQuestion {
                    index,
                    reason: format!("answer must be one of A, B, C, D (got {:?})", record.answer),
                });
            }

            questions.push(Question {
                text: record.question,
                options: [record.a, record.b, record.c, record.d],
                answer,
            });
        }

        Ok(Self { questions })
    }

    /// Fail unless there is one question for every round
    pub fn ensure_rounds(&self, rounds: usize) -> Result<(), SetupError> {
        if self.questions.len() < rounds {
            return Err(SetupError::NotEnoughQuestions {
                available: self.questions.len(),
                required: rounds,
            });
        }
        Ok(())
    }

    /// Question for a zero-based round index
    pub fn get(&self, round: usize) -> Option<&Question> {
        self.questions.get(round)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<QuestionBank, SetupError> {
        let records: Vec<QuestionRecord> = serde_json::from_str(json).unwrap();
        QuestionBank::from_records(records)
    }

    #[test]
    fn test_format_question() {
        let q = Question::new(
            "Largest planet?",
            ["Mars", "Jupiter", "Venus", "Earth"],
            "b",
        );
        assert_eq!(
            q.format(),
            "Question: Largest planet?\nA: Mars\nB: Jupiter\nC: Venus\nD: Earth"
        );
        assert_eq!(q.answer, "B");
    }

    #[test]
    fn test_is_correct_is_exact() {
        let q = Question::new("?", ["1", "2", "3", "4"], "C");
        assert!(q.is_correct("C"));
        assert!(!q.is_correct("c"));
        assert!(!q.is_correct("C "));
        assert!(!q.is_correct(""));
    }

    #[test]
    fn test_parse_keeps_file_order() {
        let bank = parse(
            r#"[
                {"question": "first", "A": "a", "B": "b", "C": "c", "D": "d", "answer": "A"},
                {"question": "second", "A": "a", "B": "b", "C": "c", "D": "d", "answer": "d"}
            ]"#,
        )
        .unwrap();

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.get(0).unwrap().text, "first");
        assert_eq!(bank.get(1).unwrap().answer, "D");
        assert!(bank.get(2).is_none());
    }

    #[test]
    fn test_rejects_bad_answer_letter() {
        let err = parse(
            r#"[{"question": "q", "A": "a", "B": "b", "C": "c", "D": "d", "answer": "E"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, SetupError::InvalidQuestion { index: 0, .. }));
    }

    #[test]
    fn test_ensure_rounds() {
        let bank = QuestionBank::new(vec![Question::new("q", ["a", "b", "c", "d"], "A")]);
        bank.ensure_rounds(1).unwrap();
        assert!(matches!(
            bank.ensure_rounds(2),
            Err(SetupError::NotEnoughQuestions {
                available: 1,
                required: 2
            })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = QuestionBank::load("/nonexistent/trivia.json").unwrap_err();
        assert!(matches!(err, SetupError::QuestionFile { .. }));
    }
}
