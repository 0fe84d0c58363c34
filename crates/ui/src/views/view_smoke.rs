use quiz_core::model::{QuizId, StudentId};
use services::SessionConfig;

use super::test_harness::{SEEDED_QUIZ, ViewKind, learner_config, setup_view_harness};

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_default_quiz() {
    let mut harness = setup_view_harness(
        ViewKind::Home,
        learner_config(),
        Some(QuizId::new(SEEDED_QUIZ)),
    );
    harness.rebuild();

    let html = harness.render_until("Start Quiz").await;
    assert!(html.contains("Ownership Basics"), "missing title in {html}");
    assert!(html.contains("10 minutes"), "missing duration in {html}");
    assert!(html.contains("Start Quiz"), "missing start link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_without_quiz_explains() {
    let mut harness = setup_view_harness(ViewKind::Home, learner_config(), None);
    harness.rebuild();

    let html = harness.render_until("No quiz selected").await;
    assert!(html.contains("No quiz selected"), "missing hint in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_asks_for_acknowledgement() {
    let mut harness = setup_view_harness(ViewKind::Quiz(SEEDED_QUIZ), learner_config(), None);
    harness.rebuild();

    let html = harness.render_until("Security Protocol").await;
    assert!(html.contains("Security Protocol"), "missing protocol in {html}");
    assert!(html.contains("I Understand, Start Quiz"), "missing accept in {html}");
    assert!(html.contains("Duration: 10:00"), "missing duration in {html}");
    assert_eq!(harness.backend.submission_count(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_read_only_shows_answers() {
    let config = SessionConfig::instructor(StudentId::new(2));
    let mut harness = setup_view_harness(ViewKind::Quiz(SEEDED_QUIZ), config, None);
    harness.rebuild();

    let html = harness.render_until("Correct Answer").await;
    assert!(html.contains("Question 1 of 2"), "missing position in {html}");
    assert!(html.contains("Correct Answer: move"), "missing answer in {html}");
    assert!(!html.contains("Palette"), "palette shown in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_reports_missing_quiz() {
    let mut harness = setup_view_harness(ViewKind::Quiz(404), learner_config(), None);
    harness.rebuild();

    let html = harness.render_until("Failed to load quiz").await;
    assert!(html.contains("Failed to load quiz"), "missing failure in {html}");
}
