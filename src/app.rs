//! Glue between a front end and the quiz engine.
//!
//! `QuizApp` receives user commands and timer ticks from one loop, forwards them
//! to the session, recovers from recognizer failures and records finished quizzes.

use chrono::Local;
use log::{info, warn};
use std::io::Write;

use crate::{
    classifier::{recognize, ClassificationError, Classifier, Raster},
    config::Config,
    display,
    history::{HistoryLog, QuizRecord},
    runtime::{QuizEvent, QuizEventSource, Runner},
    session::{QuizSession, SessionError, SessionSnapshot},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct QuizApp {
    pub session: QuizSession,
    pub config: Config,
    /// user-visible message from the last command, cleared by the next one
    pub message: Option<String>,
    history: Option<HistoryLog>,
}

impl QuizApp {
    pub fn new(session: QuizSession, config: Config) -> Self {
        Self {
            session,
            config,
            message: None,
            history: None,
        }
    }

    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = Some(history);
        self
    }

    pub fn timer_should_run(&self) -> bool {
        self.session.is_in_progress()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Classify a drawing and submit the result. On recognizer failure the
    /// session is left untouched and the error is shown to the user.
    pub fn submit_drawing<C: Classifier + ?Sized>(
        &mut self,
        classifier: &C,
        drawing: &Raster,
    ) -> Result<(), ClassificationError> {
        match recognize(classifier, drawing, self.config.raster_size, self.config.theme) {
            Ok(prediction) => {
                info!(
                    "recognized '{}' ({:.2})",
                    prediction.label, prediction.confidence
                );
                self.submit_label(&prediction.label);
                Ok(())
            }
            Err(e) => {
                warn!("classification failed: {e}");
                self.message = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn submit_label(&mut self, label: &str) {
        let result = self.session.submit_answer(label);
        self.after_command(result);
    }

    pub fn skip(&mut self) {
        let result = self.session.skip_question();
        self.after_command(result);
    }

    pub fn restart(&mut self) {
        self.message = None;
        self.session.restart();
    }

    /// Leaving the quiz screen
    pub fn leave(&mut self) {
        self.message = None;
        self.session.reset();
    }

    pub fn handle(&mut self, event: QuizEvent) -> Control {
        match event {
            QuizEvent::Tick => {
                self.session.tick();
            }
            QuizEvent::Answer(label) => self.submit_label(&label),
            QuizEvent::Skip => self.skip(),
            QuizEvent::Restart => self.restart(),
            QuizEvent::Quit => {
                self.leave();
                return Control::Quit;
            }
        }
        Control::Continue
    }

    fn after_command(&mut self, result: Result<(), SessionError>) {
        match result {
            Ok(()) => {
                self.message = None;
                if self.session.is_completed() {
                    self.record_completed();
                }
            }
            Err(e) => {
                warn!("{e}");
                self.message = Some(e.to_string());
            }
        }
    }

    fn record_completed(&self) {
        if !self.config.record_history {
            return;
        }
        let (Some(log), Some(quiz)) = (self.history.as_ref(), self.session.quiz()) else {
            return;
        };
        if let Err(e) = log.append(&QuizRecord::from_quiz(quiz, Local::now())) {
            warn!("could not record quiz history: {e}");
        }
    }
}

/// Drive a quiz from start to quit, writing prompts and results to `out`.
/// Returns the snapshot taken just before the session is torn down.
pub fn run_quiz<E: QuizEventSource, W: Write>(
    app: &mut QuizApp,
    runner: &mut Runner<E>,
    out: &mut W,
    color: bool,
) -> std::io::Result<SessionSnapshot> {
    if !app.session.is_in_progress() {
        app.session.restart();
    }
    runner.start_timer();
    render(app, out, color)?;

    let mut last = app.snapshot();
    while let Some(event) = runner.step() {
        if event == QuizEvent::Quit {
            break;
        }
        let is_tick = event == QuizEvent::Tick;
        app.handle(event);

        if app.timer_should_run() != runner.timer_running() {
            if app.timer_should_run() {
                runner.start_timer();
            } else {
                runner.stop_timer();
            }
        }

        last = app.snapshot();
        if !is_tick {
            render(app, out, color)?;
        }
    }

    runner.stop_timer();
    app.leave();
    Ok(last)
}

fn render<W: Write>(app: &QuizApp, out: &mut W, color: bool) -> std::io::Result<()> {
    if let Some(msg) = &app.message {
        writeln!(out, "! {msg}")?;
    }
    if let Some(prompt) = display::question_prompt(&app.session, color) {
        writeln!(out, "{prompt}")?;
    } else if let (true, Some(quiz)) = (app.session.is_completed(), app.session.quiz()) {
        writeln!(out, "Quiz finished!")?;
        writeln!(out, "{}", display::results_table(quiz, color))?;
        writeln!(out, "type :restart for a new quiz or :quit to leave")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ScriptedClassifier, TRANSPARENT};
    use crate::quiz::Quiz;
    use crate::session::SessionPhase;
    use tempfile::tempdir;

    fn app_with(ids: &[&str]) -> QuizApp {
        let mut session = QuizSession::with_seed(4);
        session
            .start_with(Quiz::from_identifiers(ids).unwrap())
            .unwrap();
        QuizApp::new(session, Config::default())
    }

    fn drawing() -> Raster {
        Raster::new(40, 40, TRANSPARENT)
    }

    #[test]
    fn classification_failure_leaves_session_unchanged() {
        let mut app = app_with(&["ba", "ca"]);
        let before = app.snapshot();
        let classifier = ScriptedClassifier::new();
        classifier.push(Err(ClassificationError::Inference("model busy".into())));

        assert!(app.submit_drawing(&classifier, &drawing()).is_err());
        assert_eq!(app.snapshot(), before);
        assert_eq!(
            app.message.as_deref(),
            Some("failed to perform prediction: model busy")
        );
    }

    #[test]
    fn successful_classification_submits_label() {
        let mut app = app_with(&["ba", "ca"]);
        let classifier = ScriptedClassifier::new();
        classifier.push_label("ba");

        app.submit_drawing(&classifier, &drawing()).unwrap();

        assert_eq!(app.session.current_question_index(), 1);
        assert!(app.session.quiz().unwrap().questions[0].is_correct());
        assert!(app.message.is_none());
    }

    #[test]
    fn answer_after_completion_sets_message() {
        let mut app = app_with(&["a"]);
        app.handle(QuizEvent::Answer("a".into()));
        assert!(app.session.is_completed());
        assert!(!app.timer_should_run());

        app.handle(QuizEvent::Answer("a".into()));
        assert!(app.message.as_deref().unwrap().contains("Completed"));
        assert_eq!(app.session.current_question_index(), 1);
    }

    #[test]
    fn quit_resets_session() {
        let mut app = app_with(&["a", "ba"]);
        assert_eq!(app.handle(QuizEvent::Quit), Control::Quit);
        assert_eq!(app.session.phase(), SessionPhase::NotStarted);
    }

    #[test]
    fn completed_quiz_is_recorded_once() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.csv"));
        let mut app = app_with(&["a", "ba"]).with_history(log.clone());

        app.handle(QuizEvent::Answer("a".into()));
        app.handle(QuizEvent::Skip);
        app.handle(QuizEvent::Answer("a".into()));

        let records = log.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].correct, 1);
        assert_eq!(records[0].letters, "a* ba");
    }

    #[test]
    fn abandoned_quiz_is_not_recorded() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.csv"));
        let mut app = app_with(&["a", "ba"]).with_history(log.clone());

        app.handle(QuizEvent::Answer("a".into()));
        app.handle(QuizEvent::Quit);

        assert!(log.load().unwrap().is_empty());
    }

    #[test]
    fn history_disabled_by_config() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.csv"));
        let mut app = app_with(&["a"]).with_history(log.clone());
        app.config.record_history = false;

        app.handle(QuizEvent::Answer("a".into()));

        assert!(log.load().unwrap().is_empty());
    }
}
