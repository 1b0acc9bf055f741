use std::collections::HashSet;

use aksaru::quiz::{Quiz, QUESTIONS_PER_QUIZ};
use aksaru::session::{QuizSession, SessionError, SessionPhase};
use assert_matches::assert_matches;

// End-to-end scoring scenarios against the session engine alone.

fn session_asking(ids: &[&str]) -> QuizSession {
    let mut session = QuizSession::with_seed(99);
    session
        .start_with(Quiz::from_identifiers(ids).unwrap())
        .unwrap();
    session
}

#[test]
fn every_generated_quiz_has_five_distinct_letters() {
    let mut session = QuizSession::with_seed(1234);
    session.start().unwrap();
    for _ in 0..100 {
        let quiz = session.quiz().unwrap();
        assert_eq!(quiz.questions.len(), QUESTIONS_PER_QUIZ);
        let distinct: HashSet<&str> = quiz
            .questions
            .iter()
            .map(|q| q.letter_asked.identifier.as_str())
            .collect();
        assert_eq!(distinct.len(), QUESTIONS_PER_QUIZ);
        session.restart();
    }
}

#[test]
fn correct_first_answer() {
    let mut session = session_asking(&["ba", "ca", "da", "ga", "ha"]);
    session.submit_answer("ba").unwrap();

    let q = &session.quiz().unwrap().questions[0];
    assert_eq!(session.current_question_index(), 1);
    assert_eq!(q.points, 1.0);
    assert!(q.is_correct());
}

#[test]
fn wrong_first_answer() {
    let mut session = session_asking(&["ba", "ca", "da", "ga", "ha"]);
    session.submit_answer("ca").unwrap();

    let q = &session.quiz().unwrap().questions[0];
    assert_eq!(session.current_question_index(), 1);
    assert_eq!(q.points, 0.0);
    assert!(!q.is_correct());
}

#[test]
fn five_answers_complete_and_stop_the_clock() {
    let mut session = session_asking(&["ba", "ca", "da", "ga", "ha"]);
    let answers = ["ba", "xa", "da", "ga", "ya"];

    let mut last_index = session.current_question_index();
    for answer in answers {
        assert!(!session.is_completed());
        session.tick();
        session.submit_answer(answer).unwrap();
        assert_eq!(session.current_question_index(), last_index + 1);
        last_index = session.current_question_index();
    }

    assert!(session.is_completed());
    assert_eq!(session.phase(), SessionPhase::Completed);
    let elapsed = session.elapsed_seconds();
    for _ in 0..10 {
        assert!(!session.tick());
    }
    assert_eq!(session.elapsed_seconds(), elapsed);

    let score = session.score().unwrap();
    assert_eq!(score.correct_count, 3);
    assert_eq!(score.total_points, 3.0);
    assert_eq!(session.score(), Some(score));
}

#[test]
fn restart_after_completion_starts_fresh() {
    let mut session = session_asking(&["ba", "ca"]);
    session.submit_answer("ba").unwrap();
    session.submit_answer("ca").unwrap();
    assert!(session.is_completed());

    session.restart();

    assert_eq!(session.current_question_index(), 0);
    assert!(!session.is_completed());
    assert_eq!(session.phase(), SessionPhase::InProgress);
    assert_eq!(session.quiz().unwrap().questions.len(), QUESTIONS_PER_QUIZ);
}

#[test]
fn submit_while_completed_changes_nothing() {
    let mut session = session_asking(&["ba"]);
    session.submit_answer("ca").unwrap();
    let before = session.snapshot();

    assert_matches!(
        session.submit_answer("ba"),
        Err(SessionError::InvalidState {
            phase: SessionPhase::Completed,
            ..
        })
    );
    assert_eq!(session.snapshot(), before);
}
