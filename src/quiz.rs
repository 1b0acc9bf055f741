use crate::letters::{self, Letter};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

pub const QUESTIONS_PER_QUIZ: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("unknown letter '{0}'")]
    UnknownLetter(String),
    #[error("letter '{0}' appears more than once")]
    DuplicateLetter(String),
    #[error("a quiz needs at least one question")]
    Empty,
}

/// A single letter-writing prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub letter_asked: Letter,
    pub letter_predicted: Option<String>,
    pub points: f64,
}

impl Question {
    pub fn new(letter_asked: Letter) -> Self {
        Self {
            id: Uuid::new_v4(),
            letter_asked,
            letter_predicted: None,
            points: 0.0,
        }
    }

    /// Exact, case-sensitive match between the prediction and the letter asked
    pub fn is_correct(&self) -> bool {
        self.letter_predicted.as_deref() == Some(self.letter_asked.identifier.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub time_taken: Duration,
    pub questions: Vec<Question>,
}

impl Quiz {
    fn from_letters(letters: impl IntoIterator<Item = Letter>) -> Self {
        Self {
            id: Uuid::new_v4(),
            time_taken: Duration::ZERO,
            questions: letters.into_iter().map(Question::new).collect(),
        }
    }

    /// Build a quiz over a fixed list of catalog identifiers, in the given order
    pub fn from_identifiers(identifiers: &[&str]) -> Result<Self, QuizError> {
        if identifiers.is_empty() {
            return Err(QuizError::Empty);
        }

        let mut seen = HashSet::new();
        let mut picked = Vec::with_capacity(identifiers.len());
        for &id in identifiers {
            let letter =
                letters::find(id).ok_or_else(|| QuizError::UnknownLetter(id.to_string()))?;
            if !seen.insert(id) {
                return Err(QuizError::DuplicateLetter(id.to_string()));
            }
            picked.push(letter.clone());
        }

        Ok(Self::from_letters(picked))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn score(&self) -> Score {
        Score {
            correct_count: self.questions.iter().filter(|q| q.is_correct()).count(),
            total: self.questions.len(),
            total_points: self.questions.iter().map(|q| q.points).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub correct_count: usize,
    pub total: usize,
    pub total_points: f64,
}

impl Score {
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct_count == self.total
    }
}

/// Sample distinct letters from the catalog in random order
pub fn generate_quiz<R: Rng + ?Sized>(rng: &mut R) -> Quiz {
    let mut pool = letters::catalog().to_vec();
    pool.shuffle(rng);
    pool.truncate(QUESTIONS_PER_QUIZ);
    Quiz::from_letters(pool)
}
