use crate::letters::{glyph_for, Letter};

/// Result of one practice attempt on a single letter
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeFeedback {
    pub predicted: String,
    pub is_correct: bool,
}

impl PracticeFeedback {
    /// Short toast text
    pub fn headline(&self) -> &'static str {
        if self.is_correct {
            "Correct!"
        } else {
            "Wrong!"
        }
    }

    /// Longer explanation, only for wrong attempts
    pub fn correction(&self, letter: &Letter) -> Option<String> {
        if self.is_correct {
            return None;
        }
        Some(format!(
            "Predicted: {}, but the correct answer is {}.",
            glyph_for(&self.predicted),
            letter.glyph()
        ))
    }
}

/// Untimed, unscored drill on one letter; attempts can be repeated after `clear`
#[derive(Debug, Clone)]
pub struct Practice {
    letter: Letter,
    feedback: Option<PracticeFeedback>,
    attempts: u32,
    correct_attempts: u32,
}

impl Practice {
    pub fn new(letter: Letter) -> Self {
        Self {
            letter,
            feedback: None,
            attempts: 0,
            correct_attempts: 0,
        }
    }

    pub fn letter(&self) -> &Letter {
        &self.letter
    }

    pub fn feedback(&self) -> Option<&PracticeFeedback> {
        self.feedback.as_ref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn correct_attempts(&self) -> u32 {
        self.correct_attempts
    }

    pub fn submit(&mut self, predicted: &str) -> &PracticeFeedback {
        let is_correct = predicted == self.letter.identifier;
        self.attempts += 1;
        if is_correct {
            self.correct_attempts += 1;
        }
        self.feedback.insert(PracticeFeedback {
            predicted: predicted.to_string(),
            is_correct,
        })
    }

    pub fn clear(&mut self) {
        self.feedback = None;
    }
}
