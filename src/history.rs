use crate::quiz::Quiz;
use crate::util::mean;
use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("history csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// One completed quiz as stored in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub date: DateTime<Local>,
    pub correct: usize,
    pub total: usize,
    pub points: f64,
    pub elapsed_secs: u64,
    /// asked letters joined with spaces, `*` marks correct ones
    pub letters: String,
}

impl QuizRecord {
    pub fn from_quiz(quiz: &Quiz, date: DateTime<Local>) -> Self {
        let score = quiz.score();
        let letters = quiz
            .questions
            .iter()
            .map(|q| {
                if q.is_correct() {
                    format!("{}*", q.letter_asked.identifier)
                } else {
                    q.letter_asked.identifier.clone()
                }
            })
            .join(" ");

        Self {
            date,
            correct: score.correct_count,
            total: score.total,
            points: score.total_points,
            elapsed_secs: quiz.time_taken.as_secs(),
            letters,
        }
    }
}

/// Append-only CSV log of completed quizzes
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &QuizRecord) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // A missing or empty log still needs its header
        let needs_header = fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load(&self) -> Result<Vec<QuizRecord>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let records = reader.deserialize().collect::<Result<Vec<QuizRecord>, _>>()?;
        Ok(records)
    }

    /// Most recent `limit` records, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<QuizRecord>, HistoryError> {
        let mut records = self.load()?;
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }
}

pub fn average_correct(records: &[QuizRecord]) -> Option<f64> {
    let counts = records.iter().map(|r| r.correct as f64).collect::<Vec<f64>>();
    mean(&counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;
    use tempfile::tempdir;

    fn record(correct: usize) -> QuizRecord {
        let mut quiz = Quiz::from_identifiers(&["a", "ba", "ca", "da", "e"]).unwrap();
        for q in quiz.questions.iter_mut().take(correct) {
            q.letter_predicted = Some(q.letter_asked.identifier.clone());
            q.points = 1.0;
        }
        quiz.time_taken = Duration::from_secs(12);
        QuizRecord::from_quiz(&quiz, Local.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap())
    }

    #[test]
    fn test_record_from_quiz() {
        let r = record(2);
        assert_eq!(r.correct, 2);
        assert_eq!(r.total, 5);
        assert_eq!(r.points, 2.0);
        assert_eq!(r.elapsed_secs, 12);
        assert_eq!(r.letters, "a* ba* ca da e");
    }

    #[test]
    fn test_append_and_load() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("state").join("history.csv"));

        log.append(&record(1)).unwrap();
        log.append(&record(4)).unwrap();

        let loaded = log.load().unwrap();
        assert_eq!(loaded, vec![record(1), record(4)]);

        let header_lines = fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .filter(|l| l.starts_with("date,"))
            .count();
        assert_eq!(header_lines, 1);
    }

    #[test]
    fn test_append_to_empty_file_writes_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        fs::File::create(&path).unwrap();

        let log = HistoryLog::new(path);
        log.append(&record(1)).unwrap();
        log.append(&record(4)).unwrap();

        let loaded = log.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].correct, 1);
        assert_eq!(loaded[1].correct, 4);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.csv"));
        for n in 0..4 {
            log.append(&record(n)).unwrap();
        }

        let recent = log.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].correct, 3);
        assert_eq!(recent[1].correct, 2);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("nope.csv"));
        assert!(log.load().unwrap().is_empty());
    }

    #[test]
    fn test_average_correct() {
        assert_eq!(average_correct(&[]), None);
        assert_eq!(average_correct(&[record(2), record(5)]), Some(3.5));
    }
}
