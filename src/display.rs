use crossterm::style::Stylize;
use itertools::Itertools;
use unicode_width::UnicodeWidthStr;

use crate::{
    history::QuizRecord,
    letters::{self, glyph_for, LetterClass},
    quiz::Quiz,
    session::{QuestionStatus, QuizSession},
    util::format_elapsed,
};

const LETTER_COLUMN: usize = 8;

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn mark(status: QuestionStatus, color: bool) -> String {
    let (symbol, painted) = match status {
        QuestionStatus::Correct => ("✔", "✔".green().bold()),
        QuestionStatus::Incorrect => ("✘", "✘".red().bold()),
        QuestionStatus::Current => ("?", "?".blue().bold()),
        QuestionStatus::Pending => ("○", "○".dark_grey()),
    };
    if color {
        painted.to_string()
    } else {
        symbol.to_string()
    }
}

pub fn progress_strip(statuses: &[QuestionStatus], color: bool) -> String {
    statuses.iter().map(|s| mark(*s, color)).join(" ")
}

/// Prompt for the question currently being asked
pub fn question_prompt(session: &QuizSession, color: bool) -> Option<String> {
    let question = session.current_question()?;
    let total = session.quiz().map(Quiz::len).unwrap_or_default();
    Some(format!(
        "{}  [{}]\nQuestion {}/{}: write {}",
        progress_strip(&session.question_statuses(), color),
        format_elapsed(session.elapsed_seconds()),
        session.current_question_index() + 1,
        total,
        question.letter_asked.glyph()
    ))
}

pub fn results_table(quiz: &Quiz, color: bool) -> String {
    let score = quiz.score();
    let mut lines = vec![format!("{}   predicted", pad("asked", LETTER_COLUMN))];

    for q in &quiz.questions {
        let status = if q.is_correct() {
            QuestionStatus::Correct
        } else {
            QuestionStatus::Incorrect
        };
        lines.push(format!(
            "{}{}  {}",
            pad(q.letter_asked.glyph(), LETTER_COLUMN),
            mark(status, color),
            q.letter_predicted.as_deref().map(glyph_for).unwrap_or("N/A")
        ));
    }

    lines.push(format!(
        "score {}/{} in {}",
        score.correct_count,
        score.total,
        format_elapsed(quiz.time_taken.as_secs())
    ));
    if score.is_perfect() {
        lines.push("perfect score!".to_string());
    }
    lines.join("\n")
}

pub fn letter_list(class: Option<LetterClass>) -> String {
    [LetterClass::Swara, LetterClass::Ngalagena]
        .into_iter()
        .filter(|c| class.map_or(true, |wanted| wanted == *c))
        .map(|c| {
            let row = letters::by_class(c).map(|l| l.glyph()).join(" ");
            format!("{c}\n  {row}")
        })
        .join("\n")
}

pub fn history_table(records: &[QuizRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "{}  {}/{}  {:>5}  {}",
                r.date.format("%Y-%m-%d %H:%M"),
                r.correct,
                r.total,
                format_elapsed(r.elapsed_secs),
                r.letters
            )
        })
        .join("\n")
}
