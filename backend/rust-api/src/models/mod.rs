pub mod contact;
pub mod notification;
pub mod project;
pub mod quiz;
pub mod task;
pub mod team;
pub mod user;

pub use contact::ContactSubmission;
pub use notification::{NewNotification, Notification, NotificationKind};
pub use project::{Comment, FileInfo, Project, ProjectCategory, Rating};
pub use quiz::{
    Answer, Difficulty, GivenAnswer, Question, QuestionType, Quiz, QuizAttempt, QuizOption,
};
pub use task::Task;
pub use team::Team;
pub use user::{SignUpData, User, UserProfile, UserRole};
