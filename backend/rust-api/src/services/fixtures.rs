//! Demo records written into empty storage on first run.

use chrono::{DateTime, Duration, Utc};

use crate::models::{
    Answer, Difficulty, FileInfo, GivenAnswer, Project, ProjectCategory, Question, QuestionType,
    Quiz, QuizAttempt, QuizOption, Task, User, UserRole,
};

const PLACEHOLDER_LOGO: &str = "/placeholder.png?width=150&height=150";

fn user(
    n: u32,
    username: &str,
    filiere: &str,
    role: UserRole,
    points: u32,
    badges: &[&str],
) -> User {
    let suffix = match role {
        UserRole::Stagiaire => "Stagiaire",
        UserRole::Enseignant => "Enseignant",
    };
    User {
        id: format!("user-{n}"),
        name: format!("TEST{n} {suffix}"),
        email: format!("TEST{n}@{}.com", role.as_str()),
        password: Some("password".to_string()),
        username: username.to_string(),
        logo: Some(PLACEHOLDER_LOGO.to_string()),
        filiere_id: filiere.to_string(),
        role,
        points,
        badges: badges.iter().map(|b| b.to_string()).collect(),
    }
}

pub fn initial_users() -> Vec<User> {
    use UserRole::{Enseignant, Stagiaire};
    vec![
        user(1, "TEST_dev", "DEV", Stagiaire, 250, &["Premier Projet", "Collaborateur"]),
        user(2, "TEST2_prof", "DEV", Enseignant, 0, &[]),
        user(
            3,
            "TEST3_dev",
            "ID",
            Stagiaire,
            320,
            &["Premier Projet", "Quiz Master", "Collaborateur"],
        ),
        user(4, "TEST4_dev", "ID", Stagiaire, 180, &["Premier Projet"]),
        user(
            5,
            "TEST5_dev",
            "DEV",
            Stagiaire,
            400,
            &["Premier Projet", "Innovateur", "Collaborateur"],
        ),
        user(6, "TEST6_dev", "DEV", Stagiaire, 350, &["Premier Projet", "Mobile Expert"]),
        user(
            7,
            "TEST7_ai",
            "DEV",
            Stagiaire,
            500,
            &["Premier Projet", "AI Specialist", "Innovateur"],
        ),
    ]
}

fn file(id: &str, name: &str, size: u64, mime: &str, now: DateTime<Utc>) -> FileInfo {
    FileInfo {
        id: id.to_string(),
        name: name.to_string(),
        size,
        mime_type: mime.to_string(),
        url: "#".to_string(),
        uploaded_at: now,
    }
}

#[allow(clippy::too_many_arguments)]
fn project(
    id: &str,
    title: &str,
    description: &str,
    goals: &str,
    banner: &str,
    owner_id: &str,
    category: &str,
    created_at: DateTime<Utc>,
    views: u32,
    likes: u32,
) -> Project {
    Project {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        goals: goals.to_string(),
        banner: banner.to_string(),
        owner_id: owner_id.to_string(),
        category: ProjectCategory::from(category.to_string()),
        created_at,
        files: Vec::new(),
        videos: Vec::new(),
        collaborators: Vec::new(),
        comments: Vec::new(),
        ratings: Vec::new(),
        views,
        likes,
    }
}

pub fn initial_projects(now: DateTime<Utc>) -> Vec<Project> {
    let mut security = project(
        "proj-1",
        "Core Security Components: Identity Verification, Access Control, and Resource Tracking",
        "Une plateforme d'apprentissage en ligne révolutionnaire avec des modules interactifs, des quiz et un suivi de progression personnalisé pour les étudiants du Pôle Digital.",
        "Améliorer l'engagement des étudiants, faciliter l'accès aux ressources pédagogiques et personnaliser les parcours d'apprentissage.",
        "/projet4.png?width=800&height=450",
        "user-1",
        "Développement Digital",
        now - Duration::days(3),
        120,
        15,
    );
    security.files = vec![file("f1", "doc.pdf", 1024, "application/pdf", now)];
    security.videos = vec![file("v1", "demo.mp4", 5000, "video/mp4", now)];

    let monitoring = project(
        "proj-2",
        "Dashboard de Monitoring Réseau Avancé",
        "Un outil de visualisation des performances réseau en temps réel, offrant des analyses détaillées, des alertes proactives et des rapports personnalisables pour l'infrastructure du Pôle.",
        "Identifier rapidement les goulots d'étranglement, optimiser l'utilisation des ressources réseau et garantir une haute disponibilité des services.",
        "/projet5.png?width=800&height=450",
        "user-3",
        "Infrastructure Digitale",
        now - Duration::days(7),
        85,
        8,
    );

    let mut ecommerce = project(
        "proj-ahmed-1",
        "E-Commerce Platform",
        "Une plateforme e-commerce moderne développée avec React et Node.js.",
        "Créer une solution e-commerce complète et scalable.",
        "/projet1.png?width=800&height=450",
        "user-5",
        "Développement Web",
        now - Duration::days(5),
        1250,
        89,
    );
    ecommerce.files = vec![file("ahmed-f1", "tech_spec.pdf", 2048, "application/pdf", now)];

    let mut banking = project(
        "proj-fatima-1",
        "AAA Framework: Authentication, Authorization, and Accounting",
        "Application mobile de banking développée avec Flutter.",
        "Développer une application bancaire mobile sécurisée.",
        "/projet2.png?width=800&height=450",
        "user-6",
        "Développement Mobile",
        now - Duration::days(10),
        980,
        67,
    );
    banking.videos = vec![file("fatima-v1", "app_demo.mp4", 10240, "video/mp4", now)];

    let chatbot = project(
        "proj-youssef-1",
        "AI Chatbot",
        "Chatbot intelligent développé avec Python et TensorFlow.",
        "Créer un assistant virtuel intelligent.",
        "/projet3.png?width=800&height=450",
        "user-7",
        "Intelligence Artificielle",
        now - Duration::days(8),
        1500,
        120,
    );

    vec![security, monitoring, ecommerce, banking, chatbot]
}

pub fn initial_tasks() -> Vec<Task> {
    let task = |id: &str, name: &str, completed: bool, due: &str, project: &str| Task {
        id: id.to_string(),
        name: name.to_string(),
        completed,
        due_date: due.to_string(),
        assignee: None,
        project_id: Some(project.to_string()),
    };
    vec![
        task("task-1", "Mettre en place la base de données", true, "2025-06-10", "proj-1"),
        task("task-2", "Développer le module d'authentification", true, "2025-06-11", "proj-1"),
        task("task-3", "Créer le design du dashboard", false, "2025-06-15", "proj-2"),
    ]
}

fn question(id: &str, text: &str, kind: QuestionType, options: &[&str], correct: &str) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        kind,
        options: options.iter().map(|o| QuizOption::from(*o)).collect(),
        correct_answer: Answer::Single(correct.to_string()),
    }
}

pub fn initial_quizzes(now: DateTime<Utc>) -> Vec<Quiz> {
    vec![
        Quiz {
            id: "quiz-1".to_string(),
            title: "Les Bases du Développement Web".to_string(),
            description: "Testez vos connaissances sur les fondamentaux du développement web, HTML, CSS et JavaScript.".to_string(),
            teacher_id: "user-2".to_string(),
            category: Some("Développement Web".to_string()),
            difficulty: Difficulty::Facile,
            time_limit: 10,
            questions: vec![
                question(
                    "q1-1",
                    "Que signifie HTML ?",
                    QuestionType::Qcm,
                    &[
                        "Hyper Text Markup Language",
                        "High Tech Modern Language",
                        "Hyper Transfer Markup Language",
                        "Home Tool Markup Language",
                    ],
                    "Hyper Text Markup Language",
                ),
                question(
                    "q1-2",
                    "Quelle propriété CSS est utilisée pour changer la couleur de fond d'un élément ?",
                    QuestionType::Qcm,
                    &["color", "background-color", "bgcolor", "font-color"],
                    "background-color",
                ),
                question(
                    "q1-3",
                    "JavaScript est un langage de programmation orienté objet.",
                    QuestionType::VraiFaux,
                    &["Vrai", "Faux"],
                    "Vrai",
                ),
                question(
                    "q1-4",
                    "Que signifie CSS ?",
                    QuestionType::Qcm,
                    &[
                        "Creative Style Sheets",
                        "Cascading Style Sheets",
                        "Computer Style Sheets",
                        "Colorful Style Sheets",
                    ],
                    "Cascading Style Sheets",
                ),
            ],
            published: true,
            created_at: now - Duration::days(5),
            updated_at: None,
            views: 0,
            completions: 0,
            average_score: 0.0,
        },
        Quiz {
            id: "quiz-2".to_string(),
            title: "Réseaux Informatiques".to_string(),
            description: "Évaluez votre compréhension des concepts fondamentaux des réseaux informatiques et des protocoles.".to_string(),
            teacher_id: "user-2".to_string(),
            category: Some("Infrastructure Digitale".to_string()),
            difficulty: Difficulty::Moyen,
            time_limit: 15,
            questions: vec![
                question(
                    "q2-1",
                    "Que signifie IP ?",
                    QuestionType::Qcm,
                    &[
                        "Internet Protocol",
                        "Internal Processing",
                        "Intranet Provider",
                        "Information Pathway",
                    ],
                    "Internet Protocol",
                ),
                question(
                    "q2-2",
                    "Quel est le port par défaut pour HTTP ?",
                    QuestionType::Texte,
                    &[],
                    "80",
                ),
            ],
            published: true,
            created_at: now - Duration::days(2),
            updated_at: None,
            views: 0,
            completions: 0,
            average_score: 0.0,
        },
    ]
}

fn attempt(
    id: &str,
    quiz_id: &str,
    user_id: &str,
    answers: &[(&str, &str)],
    score: u32,
    completed_at: DateTime<Utc>,
    time_taken: u32,
) -> QuizAttempt {
    QuizAttempt {
        id: id.to_string(),
        quiz_id: quiz_id.to_string(),
        user_id: user_id.to_string(),
        answers: answers
            .iter()
            .map(|(q, a)| GivenAnswer {
                question_id: q.to_string(),
                answer: Answer::Single(a.to_string()),
            })
            .collect(),
        score,
        total_questions: answers.len() as u32,
        percentage: None,
        completed_at,
        time_taken,
    }
}

pub fn initial_quiz_attempts(now: DateTime<Utc>) -> Vec<QuizAttempt> {
    let quiz1_all_right = [
        ("q1-1", "Hyper Text Markup Language"),
        ("q1-2", "background-color"),
        ("q1-3", "Vrai"),
    ];
    vec![
        attempt("attempt-1", "quiz-1", "user-1", &quiz1_all_right, 3, now - Duration::days(1), 5),
        attempt(
            "attempt-2",
            "quiz-1",
            "user-3",
            &[
                ("q1-1", "Hyper Text Markup Language"),
                ("q1-2", "color"),
                ("q1-3", "Vrai"),
            ],
            2,
            now - Duration::days(2),
            7,
        ),
        attempt(
            "attempt-3",
            "quiz-2",
            "user-1",
            &[("q2-1", "Internet Protocol"), ("q2-2", "80")],
            2,
            now - Duration::hours(12),
            10,
        ),
        attempt("attempt-4", "quiz-1", "user-5", &quiz1_all_right, 3, now - Duration::days(3), 4),
        attempt(
            "attempt-5",
            "quiz-2",
            "user-6",
            &[("q2-1", "Internet Protocol"), ("q2-2", "443")],
            1,
            now - Duration::hours(6),
            12,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_users_are_unique() {
        let users = initial_users();
        let mut emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
        emails.sort();
        emails.dedup();
        assert_eq!(emails.len(), users.len());
        assert_eq!(users[1].email, "TEST2@enseignant.com");
        assert!(users[1].is_enseignant());
    }

    #[test]
    fn test_fixture_projects_reference_fixture_users() {
        let users = initial_users();
        for project in initial_projects(Utc::now()) {
            assert!(users.iter().any(|u| u.id == project.owner_id));
        }
    }

    #[test]
    fn test_fixture_attempt_scores_match_answers() {
        let quizzes = initial_quizzes(Utc::now());
        for attempt in initial_quiz_attempts(Utc::now()) {
            let quiz = quizzes.iter().find(|q| q.id == attempt.quiz_id).unwrap();
            let correct = attempt
                .answers
                .iter()
                .filter(|given| {
                    quiz.questions
                        .iter()
                        .find(|q| q.id == given.question_id)
                        .is_some_and(|q| q.correct_answer.matches(&given.answer))
                })
                .count() as u32;
            assert_eq!(correct, attempt.score, "attempt {}", attempt.id);
        }
    }
}
