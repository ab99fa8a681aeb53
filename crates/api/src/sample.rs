use exam_core::model::{Question, Quiz, QuizId};

/// The quiz substituted when the content provider is unreachable.
///
/// Close enough to the hosted mechanics quiz that the session flow behaves
/// the same offline: five questions, thirty minutes, three correct to pass.
///
/// # Panics
///
/// Panics only if the bundled content itself is invalid, which is a
/// programming error caught by the tests below.
#[must_use]
pub fn bundled_quiz() -> Quiz {
    let questions = vec![
        question(
            "Newton's First Law of Motion is also known as the law of…",
            &["acceleration", "inertia", "action and reaction", "gravitation"],
            1,
            Some(
                "Objects at rest stay at rest and objects in motion stay in \
                 motion unless acted on by an external force.",
            ),
        ),
        question(
            "A 5 kg object accelerates at 2 m/s². What is the net force acting on it?",
            &["2.5 N", "7 N", "10 N", "3 N"],
            2,
            Some("F = ma = 5 kg x 2 m/s² = 10 N."),
        ),
        question(
            "You push a wall with 50 N of force. How much force does the wall exert back?",
            &["25 N", "50 N", "100 N", "0 N"],
            1,
            Some("Every action has an equal and opposite reaction."),
        ),
        question(
            "The net force on an object doubles while its mass stays constant. Its acceleration…",
            &["halves", "stays the same", "doubles", "quadruples"],
            2,
            None,
        ),
        question(
            "Which of these demonstrates Newton's First Law?",
            &[
                "a rocket launching into space",
                "a book sliding to a stop on a table",
                "a passenger lurching forward when a car brakes",
                "a heavy object falling faster than a light one",
            ],
            2,
            Some("The passenger's body keeps moving forward when the car stops."),
        ),
    ];

    Quiz::new(
        QuizId::new(1),
        "Mechanics Checkpoint",
        Some("Newton's laws and motion".into()),
        questions,
        30 * 60,
        3,
    )
    .expect("bundled quiz content is valid")
}

fn question(
    prompt: &str,
    options: &[&str],
    correct_option: usize,
    explanation: Option<&str>,
) -> Question {
    Question::new(
        prompt,
        options.iter().map(|o| (*o).to_owned()).collect(),
        correct_option,
        explanation.map(str::to_owned),
    )
    .expect("bundled question content is valid")
}
