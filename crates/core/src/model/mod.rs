mod answer_sheet;
mod ids;
mod quiz;
mod result;

pub use answer_sheet::AnswerSheet;
pub use ids::QuizId;
pub use quiz::{Question, Quiz, QuizError, option_label};
pub use result::{QuestionOutcome, QuizResult, ResultError};
