use crate::quiz::{generate_quiz, Question, Quiz, Score};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while the session is {phase}")]
    InvalidState {
        action: &'static str,
        phase: SessionPhase,
    },
}

/// Progress mark for one question of the running quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuestionStatus {
    Correct,
    Incorrect,
    Current,
    Pending,
}

/// Read-only view handed to front ends after every mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub current_question_index: usize,
    pub is_completed: bool,
    pub elapsed_seconds: u64,
    pub quiz: Option<Quiz>,
    pub score: Option<Score>,
}

/// Owns one quiz attempt at a time and is the only writer of its state
#[derive(Debug)]
pub struct QuizSession {
    phase: SessionPhase,
    current_question_index: usize,
    quiz: Option<Quiz>,
    elapsed_seconds: u64,
    rng: StdRng,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic quiz generation, mostly for tests and replays
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            phase: SessionPhase::NotStarted,
            current_question_index: 0,
            quiz: None,
            elapsed_seconds: 0,
            rng,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn is_in_progress(&self) -> bool {
        self.phase == SessionPhase::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.quiz
            .as_ref()
            .is_some_and(|q| self.current_question_index == q.len())
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        let quiz = generate_quiz(&mut self.rng);
        self.start_with(quiz)
    }

    /// Start with a caller-built quiz instead of a random one
    pub fn start_with(&mut self, quiz: Quiz) -> Result<(), SessionError> {
        if self.phase != SessionPhase::NotStarted {
            return Err(self.invalid("start"));
        }
        self.begin(quiz);
        Ok(())
    }

    /// Throw away the current attempt and begin a new random quiz
    pub fn restart(&mut self) {
        let quiz = generate_quiz(&mut self.rng);
        self.begin(quiz);
    }

    /// Tear the session down without keeping anything
    pub fn reset(&mut self) {
        if let Some(quiz) = self.quiz.take() {
            debug!("discarding quiz {} at question {}", quiz.id, self.current_question_index);
        }
        self.phase = SessionPhase::NotStarted;
        self.current_question_index = 0;
        self.elapsed_seconds = 0;
    }

    pub fn submit_answer(&mut self, predicted_label: &str) -> Result<(), SessionError> {
        self.record(Some(predicted_label.to_string()), "submit an answer")
    }

    /// Move past the current question without a prediction; scores zero
    pub fn skip_question(&mut self) -> Result<(), SessionError> {
        self.record(None, "skip a question")
    }

    /// One second of the elapsed counter. Returns whether the tick was counted.
    pub fn tick(&mut self) -> bool {
        if self.phase != SessionPhase::InProgress {
            return false;
        }
        self.elapsed_seconds += 1;
        true
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            SessionPhase::InProgress => self
                .quiz
                .as_ref()
                .and_then(|q| q.questions.get(self.current_question_index)),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<Score> {
        self.quiz.as_ref().map(Quiz::score)
    }

    pub fn question_statuses(&self) -> Vec<QuestionStatus> {
        let Some(quiz) = self.quiz.as_ref() else {
            return Vec::new();
        };

        quiz.questions
            .iter()
            .enumerate()
            .map(|(idx, q)| {
                if idx < self.current_question_index {
                    if q.is_correct() {
                        QuestionStatus::Correct
                    } else {
                        QuestionStatus::Incorrect
                    }
                } else if idx == self.current_question_index {
                    QuestionStatus::Current
                } else {
                    QuestionStatus::Pending
                }
            })
            .collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            current_question_index: self.current_question_index,
            is_completed: self.is_completed(),
            elapsed_seconds: self.elapsed_seconds,
            quiz: self.quiz.clone(),
            score: self.score(),
        }
    }

    fn begin(&mut self, quiz: Quiz) {
        info!("starting quiz {} with {} questions", quiz.id, quiz.len());
        self.quiz = Some(quiz);
        self.current_question_index = 0;
        self.elapsed_seconds = 0;
        self.phase = SessionPhase::InProgress;
        // an empty quiz is complete before the first answer
        self.complete_if_done();
    }

    fn record(
        &mut self,
        prediction: Option<String>,
        action: &'static str,
    ) -> Result<(), SessionError> {
        if self.phase != SessionPhase::InProgress {
            return Err(self.invalid(action));
        }
        let idx = self.current_question_index;
        let question = self
            .quiz
            .as_mut()
            .and_then(|q| q.questions.get_mut(idx))
            .ok_or(SessionError::InvalidState {
                action,
                phase: SessionPhase::Completed,
            })?;

        question.letter_predicted = prediction;
        question.points = if question.is_correct() { 1.0 } else { 0.0 };
        debug!(
            "question {} ({}): predicted {:?}, points {}",
            idx, question.letter_asked.identifier, question.letter_predicted, question.points
        );

        self.current_question_index += 1;
        self.complete_if_done();
        Ok(())
    }

    fn complete_if_done(&mut self) {
        let Some(quiz) = self.quiz.as_mut() else {
            return;
        };
        if self.current_question_index == quiz.len() {
            quiz.time_taken = Duration::from_secs(self.elapsed_seconds);
            self.phase = SessionPhase::Completed;
            let score = quiz.score();
            info!(
                "quiz {} completed: {}/{} correct in {}s",
                quiz.id, score.correct_count, score.total, self.elapsed_seconds
            );
        }
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidState {
            action,
            phase: self.phase,
        }
    }
}
