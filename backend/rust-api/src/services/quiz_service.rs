use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::metrics::record_event;
use crate::models::quiz::{QuestionDraft, QuizDraft, QuizResult};
use crate::models::{
    Answer, GivenAnswer, NewNotification, NotificationKind, Question, Quiz, QuizAttempt, User,
};
use crate::services::error::{require, PortalError};
use crate::services::portal_store::PortalStore;
use crate::storage::Update;
use crate::utils::time::time_based_id;

pub const QUIZ_MASTER_BADGE: &str = "Quiz Master";
const QUIZ_MASTER_THRESHOLD: u32 = 80;
const POINTS_PER_TEN_PERCENT: u32 = 5;

pub struct QuizService {
    store: Arc<PortalStore>,
}

impl QuizService {
    pub fn new(store: Arc<PortalStore>) -> Self {
        Self { store }
    }

    /// Stores a new unpublished quiz authored by `teacher`.
    pub fn create_quiz(&self, teacher: &User, draft: QuizDraft) -> Result<Quiz, PortalError> {
        let questions = validate_draft(&draft)?;

        let quiz = Quiz {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            teacher_id: teacher.id.clone(),
            category: draft.category.filter(|c| !c.trim().is_empty()),
            difficulty: draft.difficulty,
            time_limit: draft.time_limit,
            questions,
            published: false,
            created_at: Utc::now(),
            updated_at: None,
            views: 0,
            completions: 0,
            average_score: 0.0,
        };

        self.store.quizzes().modify(|quizzes| {
            quizzes.push(quiz.clone());
            Update::Changed(())
        });
        tracing::info!("Quiz {} created by {}", quiz.id, teacher.id);
        Ok(quiz)
    }

    /// Replaces the editable content of a quiz, keeping its id, author,
    /// publication state and counters.
    pub fn update_quiz(&self, quiz_id: &str, draft: QuizDraft) -> Result<Quiz, PortalError> {
        let questions = validate_draft(&draft)?;

        self.store
            .quizzes()
            .modify(|quizzes| match quizzes.iter_mut().find(|q| q.id == quiz_id) {
                Some(quiz) => {
                    quiz.title = draft.title;
                    quiz.description = draft.description;
                    quiz.category = draft.category.filter(|c| !c.trim().is_empty());
                    quiz.difficulty = draft.difficulty;
                    quiz.time_limit = draft.time_limit;
                    quiz.questions = questions;
                    quiz.updated_at = Some(Utc::now());
                    Update::Changed(Some(quiz.clone()))
                }
                None => Update::Unchanged(None),
            })
            .ok_or_else(|| PortalError::not_found("quiz", quiz_id))
    }

    pub fn delete_quiz(&self, quiz_id: &str) -> Result<(), PortalError> {
        let removed = self.store.quizzes().modify(|quizzes| {
            let before = quizzes.len();
            quizzes.retain(|q| q.id != quiz_id);
            if quizzes.len() == before {
                Update::Unchanged(false)
            } else {
                Update::Changed(true)
            }
        });
        if removed {
            tracing::info!("Quiz {} deleted", quiz_id);
            Ok(())
        } else {
            Err(PortalError::not_found("quiz", quiz_id))
        }
    }

    pub fn toggle_publish(&self, quiz_id: &str) -> Result<Quiz, PortalError> {
        self.store
            .quizzes()
            .modify(|quizzes| match quizzes.iter_mut().find(|q| q.id == quiz_id) {
                Some(quiz) => {
                    quiz.published = !quiz.published;
                    quiz.updated_at = Some(Utc::now());
                    Update::Changed(Some(quiz.clone()))
                }
                None => Update::Unchanged(None),
            })
            .ok_or_else(|| PortalError::not_found("quiz", quiz_id))
    }

    /// Newest first.
    pub fn list_quizzes(&self, published_only: bool) -> Vec<Quiz> {
        let mut quizzes: Vec<Quiz> = self.store.quizzes().read(|quizzes| {
            quizzes
                .iter()
                .filter(|q| !published_only || q.published)
                .cloned()
                .collect()
        });
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        quizzes
    }

    pub fn get_quiz(&self, quiz_id: &str) -> Option<Quiz> {
        self.store
            .quizzes()
            .read(|quizzes| quizzes.iter().find(|q| q.id == quiz_id).cloned())
    }

    /// Scores `answers` against the quiz. Anonymous submissions are only
    /// scored; a logged-in user also gets the attempt recorded, the points,
    /// the badge and a notification.
    pub fn submit_attempt(
        &self,
        user: Option<&User>,
        quiz_id: &str,
        answers: Vec<GivenAnswer>,
        time_taken: u32,
    ) -> Result<QuizResult, PortalError> {
        let quiz = self
            .get_quiz(quiz_id)
            .ok_or_else(|| PortalError::not_found("quiz", quiz_id))?;
        if quiz.questions.is_empty() {
            return Err(PortalError::Validation("quiz has no questions".to_string()));
        }

        let correct = count_correct(&quiz.questions, &answers);
        let total = quiz.questions.len() as u32;
        let percentage = score_percentage(correct, total);

        let mut result = QuizResult {
            correct,
            total,
            percentage,
            points_awarded: 0,
            badge_awarded: None,
            attempt_id: None,
        };

        let Some(user) = user else {
            record_event("quiz_attempt", true);
            return Ok(result);
        };

        let points = points_for(percentage);
        let earns_badge = percentage >= QUIZ_MASTER_THRESHOLD && !user.has_badge(QUIZ_MASTER_BADGE);

        let attempt = QuizAttempt {
            id: time_based_id("attempt"),
            quiz_id: quiz.id.clone(),
            user_id: user.id.clone(),
            answers,
            score: correct,
            total_questions: total,
            percentage: Some(percentage),
            completed_at: Utc::now(),
            time_taken,
        };
        self.store.quiz_attempts().modify(|attempts| {
            attempts.push(attempt.clone());
            Update::Changed(())
        });
        self.record_completion(&quiz.id);

        self.store.award(
            &user.id,
            points,
            (percentage >= QUIZ_MASTER_THRESHOLD).then_some(QUIZ_MASTER_BADGE),
        );
        self.store.add_notification(NewNotification {
            user_id: user.id.clone(),
            kind: NotificationKind::QuizCompleted,
            message: format!(
                "Vous avez terminé le quiz \"{}\" avec un score de {}% et gagné {} points!",
                quiz.title, percentage, points
            ),
            link: Some(format!("/quizzes/{}", quiz.id)),
        });
        record_event("quiz_attempt", true);

        tracing::info!(
            "Quiz {} completed by {}: {}/{} ({}%)",
            quiz.id,
            user.id,
            correct,
            total,
            percentage
        );

        result.points_awarded = points;
        result.badge_awarded = earns_badge.then(|| QUIZ_MASTER_BADGE.to_string());
        result.attempt_id = Some(attempt.id);
        Ok(result)
    }

    pub fn attempts_for_quiz(&self, quiz_id: &str) -> Vec<QuizAttempt> {
        self.store.quiz_attempts().read(|attempts| {
            attempts
                .iter()
                .filter(|a| a.quiz_id == quiz_id)
                .cloned()
                .collect()
        })
    }

    /// Completion counter and running average of the recorded attempts.
    fn record_completion(&self, quiz_id: &str) {
        let attempts = self.attempts_for_quiz(quiz_id);
        let average = if attempts.is_empty() {
            0.0
        } else {
            let total: f64 = attempts
                .iter()
                .map(|a| f64::from(attempt_percentage(a)))
                .sum();
            total / attempts.len() as f64
        };

        self.store.quizzes().modify(|quizzes| {
            match quizzes.iter_mut().find(|q| q.id == quiz_id) {
                Some(quiz) => {
                    quiz.completions = attempts.len() as u32;
                    quiz.average_score = average;
                    Update::Changed(())
                }
                None => Update::Unchanged(()),
            }
        });
    }
}

fn validate_draft(draft: &QuizDraft) -> Result<Vec<Question>, PortalError> {
    validator::Validate::validate(draft)?;
    require(&draft.title, "title")?;
    require(&draft.description, "description")?;
    if draft.questions.is_empty() {
        return Err(PortalError::Validation(
            "a quiz needs at least one question".to_string(),
        ));
    }
    draft.questions.iter().try_for_each(|q| require(&q.text, "question text"))?;

    Ok(draft
        .questions
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, q)| into_question(q, i))
        .collect())
}

fn into_question(draft: QuestionDraft, index: usize) -> Question {
    Question {
        id: draft
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("{}-{}", time_based_id("q"), index)),
        text: draft.text,
        kind: draft.kind,
        options: draft.options,
        correct_answer: draft.correct_answer,
    }
}

/// Unanswered questions count as wrong.
pub fn count_correct(questions: &[Question], answers: &[GivenAnswer]) -> u32 {
    let given: HashMap<&str, &Answer> = answers
        .iter()
        .map(|a| (a.question_id.as_str(), &a.answer))
        .collect();

    questions
        .iter()
        .filter(|q| {
            given
                .get(q.id.as_str())
                .is_some_and(|answer| q.correct_answer.matches(answer))
        })
        .count() as u32
}

pub fn score_percentage(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(correct) / f64::from(total) * 100.0).round() as u32
}

/// Five points per ten percent.
pub fn points_for(percentage: u32) -> u32 {
    (f64::from(percentage) / 10.0).round() as u32 * POINTS_PER_TEN_PERCENT
}

/// Stored attempts may predate the percentage field.
fn attempt_percentage(attempt: &QuizAttempt) -> u32 {
    attempt
        .percentage
        .unwrap_or_else(|| score_percentage(attempt.score, attempt.total_questions))
}
