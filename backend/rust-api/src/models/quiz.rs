use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::time::{iso_millis, iso_millis_option};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(alias = "createdBy")]
    pub teacher_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Minutes
    pub time_limit: u32,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub published: bool,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso_millis_option"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub views: u32,
    #[serde(default)]
    pub completions: u32,
    #[serde(default)]
    pub average_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Facile,
    #[default]
    Moyen,
    Difficile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub options: Vec<QuizOption>,
    pub correct_answer: Answer,
}

/// An answer choice. Bundled quizzes store plain strings, the quiz editor
/// stores `{id, text, isCorrect}` objects; both are written back unchanged.
/// Scoring only looks at `correctAnswer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuizOption {
    Text(String),
    Choice {
        id: String,
        text: String,
        #[serde(rename = "isCorrect", default)]
        is_correct: bool,
    },
    Other(serde_json::Value),
}

impl QuizOption {
    pub fn text(&self) -> Option<&str> {
        match self {
            QuizOption::Text(text) | QuizOption::Choice { text, .. } => Some(text),
            QuizOption::Other(_) => None,
        }
    }
}

impl From<&str> for QuizOption {
    fn from(text: &str) -> Self {
        QuizOption::Text(text.to_string())
    }
}

/// Question tags as written by the quiz editor; the lowercase tags found in
/// older stored quizzes are accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "QCM", alias = "qcm")]
    Qcm,
    #[serde(rename = "QRM", alias = "qrm")]
    Qrm,
    #[serde(rename = "Vrai/Faux", alias = "truefalse")]
    VraiFaux,
    #[serde(rename = "Texte", alias = "text")]
    Texte,
}

/// A single answer, or the set of answers of a multiple-response question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Multiple(Vec<String>),
}

impl Answer {
    /// Single answers compare case-insensitively, multiple answers as sets.
    pub fn matches(&self, given: &Answer) -> bool {
        match (self, given) {
            (Answer::Single(expected), Answer::Single(given)) => {
                expected.to_lowercase() == given.to_lowercase()
            }
            (Answer::Multiple(expected), Answer::Multiple(given)) => {
                expected.len() == given.len() && expected.iter().all(|a| given.contains(a))
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: String,
    pub quiz_id: String,
    pub user_id: String,
    pub answers: Vec<GivenAnswer>,
    /// Number of correct answers
    pub score: u32,
    pub total_questions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u32>,
    #[serde(with = "iso_millis")]
    pub completed_at: DateTime<Utc>,
    /// Minutes
    pub time_taken: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GivenAnswer {
    pub question_id: String,
    pub answer: Answer,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_time_limit")]
    #[validate(range(min = 1, max = 600, message = "Time limit must be between 1 and 600 minutes"))]
    pub time_limit: u32,
    pub questions: Vec<QuestionDraft>,
}

fn default_time_limit() -> u32 {
    30
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    /// Kept when editing an existing question
    pub id: Option<String>,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub options: Vec<QuizOption>,
    pub correct_answer: Answer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptRequest {
    pub answers: Vec<GivenAnswer>,
    #[serde(default)]
    pub time_taken: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuizzesQuery {
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
    pub points_awarded: u32,
    pub badge_awarded: Option<String>,
    pub attempt_id: Option<String>,
}
