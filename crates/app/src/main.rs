use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use backend::{ApiError, Backend, HttpBackend, HttpConfig, InMemoryBackend};
use quiz_core::model::{
    AnswerOption, OptionId, Question, QuestionId, Quiz, QuizId, StudentId, TopicId, TopicRef,
};
use services::SessionConfig;
use services::quiz::KeyChord;
use ui::{App, UiApp, build_app_context};

const DEFAULT_LOG_FILTER: &str = "app=info,services=info,backend=info";
const DEMO_QUIZ: u64 = 1;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidId { flag: &'static str, raw: String },
    InvalidApiUrl { raw: String },
    InvalidChord { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api value: {raw}"),
            ArgsError::InvalidChord { raw } => write!(f, "invalid --capture-key value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_id<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidId { flag, raw })
}

fn env_id<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

struct DesktopApp {
    backend: Backend,
    config: SessionConfig,
    quiz_id: Option<QuizId>,
}

impl UiApp for DesktopApp {
    fn backend(&self) -> Backend {
        self.backend.clone()
    }

    fn session_config(&self) -> SessionConfig {
        self.config.clone()
    }

    fn default_quiz(&self) -> Option<QuizId> {
        self.quiz_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Exam,
    Practice,
    Preview,
}

struct Args {
    http: HttpConfig,
    quiz_id: Option<QuizId>,
    student_id: StudentId,
    topic_id: Option<TopicId>,
    warn_at_secs: Option<u32>,
    capture_keys: Vec<KeyChord>,
    mode: Mode,
    demo: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api <url>] [--token <token>] [--quiz-id <id>]");
    eprintln!("                      [--student-id <id>] [--topic-id <id>]");
    eprintln!("                      [--warn-at <secs>] [--request-timeout <secs>]");
    eprintln!("                      [--capture-key <chord>]...");
    eprintln!("                      [--practice | --read-only] [--demo]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api {}", backend::http::DEFAULT_API_URL);
    eprintln!("  --student-id 1");
    eprintln!("  --warn-at 30");
    eprintln!("  --request-timeout {}", backend::http::DEFAULT_REQUEST_TIMEOUT.as_secs());
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --practice   untimed attempt that only warns on tab switches");
    eprintln!("  --read-only  instructor preview with answers shown, nothing submitted");
    eprintln!("  --demo       serve a built-in quiz from memory instead of the API");
    eprintln!("  --capture-key Ctrl+Shift+S");
    eprintln!("               also treat this chord as a screenshot attempt");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LEARN_API_URL, LEARN_API_TOKEN, LEARN_QUIZ_ID, LEARN_STUDENT_ID, LEARN_TOPIC_ID");
    eprintln!("  LEARN_WARN_AT_SECS");
    eprintln!("  RUST_LOG (default: {DEFAULT_LOG_FILTER})");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut http = HttpConfig::from_env();
        let mut quiz_id = env_id::<QuizId>("LEARN_QUIZ_ID");
        let mut student_id = env_id::<StudentId>("LEARN_STUDENT_ID").unwrap_or(StudentId::new(1));
        let mut topic_id = env_id::<TopicId>("LEARN_TOPIC_ID");
        let mut warn_at_secs = env_id::<u32>("LEARN_WARN_AT_SECS");
        let mut capture_keys = Vec::new();
        let mut mode = Mode::Exam;
        let mut demo = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => {
                    let value = require_value(args, "--api")?;
                    if !value.starts_with("http://") && !value.starts_with("https://") {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                    http.base_url = value;
                }
                "--token" => {
                    let value = require_value(args, "--token")?;
                    http = http.with_token(Some(value));
                }
                "--quiz-id" => {
                    quiz_id = Some(parse_id(require_value(args, "--quiz-id")?, "--quiz-id")?);
                }
                "--student-id" => {
                    student_id = parse_id(require_value(args, "--student-id")?, "--student-id")?;
                }
                "--topic-id" => {
                    topic_id = Some(parse_id(require_value(args, "--topic-id")?, "--topic-id")?);
                }
                "--warn-at" => {
                    warn_at_secs = Some(parse_id(require_value(args, "--warn-at")?, "--warn-at")?);
                }
                "--request-timeout" => {
                    let secs: u64 = parse_id(
                        require_value(args, "--request-timeout")?,
                        "--request-timeout",
                    )?;
                    http = http.with_timeout(Duration::from_secs(secs));
                }
                "--capture-key" => {
                    let raw = require_value(args, "--capture-key")?;
                    let chord = raw
                        .parse::<KeyChord>()
                        .map_err(|_| ArgsError::InvalidChord { raw })?;
                    capture_keys.push(chord);
                }
                "--practice" => mode = Mode::Practice,
                "--read-only" => mode = Mode::Preview,
                "--demo" => demo = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            http,
            quiz_id,
            student_id,
            topic_id,
            warn_at_secs,
            capture_keys,
            mode,
            demo,
        })
    }

    fn session_config(&self) -> SessionConfig {
        let config = match self.mode {
            Mode::Exam => SessionConfig::new(self.student_id),
            Mode::Practice => SessionConfig::practice(self.student_id),
            Mode::Preview => SessionConfig::instructor(self.student_id),
        };
        let mut config = config.with_topic(self.topic_id);
        if let Some(secs) = self.warn_at_secs {
            config = config.with_low_water_secs(secs);
        }
        if !self.capture_keys.is_empty() {
            let chords = std::iter::once(KeyChord::print_screen())
                .chain(self.capture_keys.iter().cloned())
                .collect();
            config = config.with_capture_chords(chords);
        }
        config
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

fn demo_backend() -> Result<InMemoryBackend, ApiError> {
    let backend = InMemoryBackend::new();
    let quiz = Quiz::new(QuizId::new(DEMO_QUIZ), "Rust Ownership Check", Some(5)).with_topic(
        TopicRef {
            id: TopicId::new(1),
            name: "Ownership & Borrowing".into(),
            course_id: None,
        },
    );
    let questions = vec![
        Question::new(
            QuestionId::new(1),
            "What happens to a `String` after it is passed by value to a function?",
            vec![
                AnswerOption::new(OptionId::new(11), "It is copied"),
                AnswerOption::new(OptionId::new(12), "It is moved"),
                AnswerOption::new(OptionId::new(13), "It is borrowed"),
            ],
        )
        .with_correct_answer("It is moved"),
        Question::new(
            QuestionId::new(2),
            "How many mutable references to a value may exist at once?",
            vec![
                AnswerOption::new(OptionId::new(21), "One"),
                AnswerOption::new(OptionId::new(22), "Two"),
                AnswerOption::new(OptionId::new(23), "Unlimited"),
            ],
        )
        .with_correct_answer("One"),
        Question::new(
            QuestionId::new(3),
            "Which trait lets a type be duplicated implicitly?",
            vec![
                AnswerOption::new(OptionId::new(31), "Clone"),
                AnswerOption::new(OptionId::new(32), "Copy"),
                AnswerOption::new(OptionId::new(33), "Send"),
            ],
        )
        .with_correct_answer("Copy"),
    ];
    backend.insert_quiz(quiz, questions)?;
    Ok(backend)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();

    let (backend, quiz_id) = if parsed.demo {
        let memory = demo_backend()?;
        let quiz_id = parsed.quiz_id.unwrap_or(QuizId::new(DEMO_QUIZ));
        tracing::info!(%quiz_id, "serving demo quiz from memory");
        (Backend::in_memory(&memory), Some(quiz_id))
    } else {
        tracing::info!(api = %parsed.http.base_url, "using quiz API");
        (
            Backend::http(HttpBackend::new(parsed.http.clone())?),
            parsed.quiz_id,
        )
    };

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        backend,
        config: parsed.session_config(),
        quiz_id,
    });
    let context = build_app_context(&app);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("LearnSphere Quiz")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
