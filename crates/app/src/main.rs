use std::fmt;
use std::sync::Arc;

use api::RemoteApi;
use exam_core::model::{QuizId, option_label};
use exam_core::session::SessionState;
use services::{
    Clock, SessionCommand, SessionController, SessionSnapshot, format_clock, time_pressure,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuizId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid --quiz-id value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

struct Args {
    quiz_id: QuizId,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut quiz_id = std::env::var("EXAM_QUIZ_ID")
            .ok()
            .and_then(|value| value.parse::<QuizId>().ok())
            .unwrap_or(QuizId::new(1));

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--quiz-id" => {
                    let value = args.next().ok_or(ArgsError::MissingValue { flag: "--quiz-id" })?;
                    quiz_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidQuizId { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { quiz_id })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--quiz-id <id>]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_API_BASE_URL   exam backend base URL (offline mode when unset)");
    eprintln!("  EXAM_API_TOKEN      optional bearer token");
    eprintln!("  EXAM_QUIZ_ID        default quiz to open");
    eprintln!();
    eprintln!("Session commands:");
    eprintln!("  start | a <letter> | next | prev | goto <n>");
    eprintln!("  pause | resume | submit | quit");
}

/// Map one input line onto a session command, relative to the snapshot the
/// user was looking at. `None` means "not a command, re-render".
fn parse_command(line: &str, snapshot: &SessionSnapshot) -> Option<SessionCommand> {
    let mut words = line.split_whitespace();
    let head = words.next()?;

    match head {
        "start" => Some(SessionCommand::Start),
        "pause" => Some(SessionCommand::Pause),
        "resume" => Some(SessionCommand::Resume),
        "submit" => Some(SessionCommand::Submit),
        "restart" => Some(SessionCommand::Restart),
        "next" => Some(SessionCommand::GoToQuestion(snapshot.current_question + 1)),
        "prev" => Some(SessionCommand::GoToQuestion(
            snapshot.current_question.checked_sub(1)?,
        )),
        "goto" => {
            let number: usize = words.next()?.parse().ok()?;
            Some(SessionCommand::GoToQuestion(number.checked_sub(1)?))
        }
        "a" | "answer" => {
            let option_index = parse_option(words.next()?)?;
            Some(SessionCommand::SelectAnswer {
                question_index: snapshot.current_question,
                option_index,
            })
        }
        _ => None,
    }
}

/// Accept an option by its label (`a`, `B`, …).
fn parse_option(word: &str) -> Option<usize> {
    let mut chars = word.chars();
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let letter = letter.to_ascii_uppercase();
    letter.is_ascii_uppercase().then(|| (letter as usize) - ('A' as usize))
}

fn render_header(controller: &SessionController) {
    let quiz = controller.quiz();
    println!("== {} ==", quiz.title());
    if let Some(description) = quiz.description() {
        println!("{description}");
    }
    if controller.used_fallback() {
        println!("(showing the bundled quiz; the content service was unreachable)");
    }
    println!(
        "{} questions | {} on the clock | {} correct to pass",
        quiz.question_count(),
        format_clock(quiz.time_limit_secs()),
        quiz.passing_score()
    );
    println!("Type 'start' (or press Enter) to begin; run with --help for all commands.");
}

fn render_question(controller: &SessionController, snapshot: &SessionSnapshot) {
    let quiz = controller.quiz();
    let Some(question) = quiz.question(snapshot.current_question) else {
        return;
    };

    let pressure = time_pressure(snapshot.remaining_secs, quiz.time_limit_secs());
    println!(
        "[{}] question {}/{} | answered {} | {:?}{}",
        format_clock(snapshot.remaining_secs),
        snapshot.current_question + 1,
        quiz.question_count(),
        snapshot.progress.answered,
        pressure,
        if snapshot.paused { " | paused" } else { "" },
    );
    println!("{}", question.prompt());
    let selected = controller.selected_answer(snapshot.current_question);
    for (index, option) in question.options().iter().enumerate() {
        let marker = if selected == Some(index) { '*' } else { ' ' };
        println!(" {marker}{}. {option}", option_label(index));
    }
}

fn render_result(controller: &SessionController) {
    let Some(view) = controller.result_view() else {
        return;
    };
    println!();
    println!(
        "{}: {} correct ({}%), {} spent",
        if view.passed { "PASSED" } else { "NOT PASSED" },
        view.score_line,
        view.percentage,
        view.time_spent
    );

    let Some(review) = controller.review() else {
        return;
    };
    println!();
    println!("Review:");
    for item in review {
        let verdict = if item.correct { "ok " } else { "MISS" };
        let selected = item
            .selected_option
            .map_or("-".to_string(), |o| option_label(o).to_string());
        println!(
            " {verdict} q{} answered {selected}, correct {}  {}",
            item.question_index + 1,
            option_label(item.correct_option),
            item.prompt
        );
        if !item.correct
            && let Some(explanation) = item.explanation
        {
            println!("      {explanation}");
        }
    }
}

async fn read_line() -> Option<String> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(_) => None,
        }
    })
    .await
    .ok()
    .flatten()
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let remote = Arc::new(RemoteApi::from_env());
    if !remote.enabled() {
        log::info!("EXAM_API_BASE_URL not set; running offline against the bundled quiz");
    }

    let controller = SessionController::load(
        args.quiz_id,
        Arc::clone(&remote),
        Arc::clone(&remote),
        Clock::default(),
    )
    .await;

    render_header(&controller);

    loop {
        let snapshot = controller.snapshot();
        match snapshot.state {
            SessionState::NotStarted => println!("> (start)"),
            SessionState::Active => render_question(&controller, &snapshot),
            SessionState::Submitted => {
                if snapshot.result.is_some() {
                    break;
                }
                // The scoring pipeline is still in flight; let it land.
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                continue;
            }
        }

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line == "quit" {
            break;
        }
        let command = match parse_command(line, &snapshot) {
            Some(command) => command,
            None if line.is_empty() && snapshot.state == SessionState::NotStarted => {
                SessionCommand::Start
            }
            None => {
                println!("unrecognised command: {line}");
                continue;
            }
        };
        controller.apply(command).await;
    }

    render_result(&controller);

    if remote.enabled() {
        match controller.history(5).await {
            Ok(history) if !history.is_empty() => {
                println!();
                println!("Recent attempts:");
                for attempt in history {
                    println!(
                        "  {}  {}/{} ({}%){}",
                        attempt.submitted_at.format("%Y-%m-%d %H:%M"),
                        attempt.correct_count,
                        attempt.total_questions,
                        attempt.percentage,
                        if attempt.passed { ", passed" } else { "" }
                    );
                }
            }
            Ok(_) => {}
            Err(err) => log::warn!("could not load attempt history: {err}"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::session::SessionState;
    use services::SessionProgress;

    fn snapshot_at(current_question: usize) -> SessionSnapshot {
        SessionSnapshot {
            state: SessionState::Active,
            paused: false,
            current_question,
            remaining_secs: 60,
            progress: SessionProgress {
                total_questions: 3,
                answered: 0,
                unanswered: 3,
            },
            result: None,
        }
    }

    #[test]
    fn option_letters_parse_case_insensitively() {
        assert_eq!(parse_option("a"), Some(0));
        assert_eq!(parse_option("C"), Some(2));
        assert_eq!(parse_option("ab"), None);
        assert_eq!(parse_option("3"), None);
    }

    #[test]
    fn commands_are_relative_to_the_current_question() {
        let snapshot = snapshot_at(1);

        assert_eq!(
            parse_command("a b", &snapshot),
            Some(SessionCommand::SelectAnswer {
                question_index: 1,
                option_index: 1
            })
        );
        assert_eq!(
            parse_command("next", &snapshot),
            Some(SessionCommand::GoToQuestion(2))
        );
        assert_eq!(
            parse_command("prev", &snapshot),
            Some(SessionCommand::GoToQuestion(0))
        );
        assert_eq!(
            parse_command("goto 3", &snapshot),
            Some(SessionCommand::GoToQuestion(2))
        );
    }

    #[test]
    fn prev_at_the_first_question_is_not_a_command() {
        let snapshot = snapshot_at(0);
        assert_eq!(parse_command("prev", &snapshot), None);
        assert_eq!(parse_command("goto 0", &snapshot), None);
        assert_eq!(parse_command("gibberish", &snapshot), None);
    }
}
