use std::collections::BTreeMap;

use quiz_core::model::{Question, QuestionId};

/// One row of the review screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub index: usize,
    pub question_id: QuestionId,
    pub prompt: String,
    pub answer: Option<String>,
}

impl ReviewItem {
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// Aggregated answered/unanswered view over the whole quiz.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewSummary {
    pub items: Vec<ReviewItem>,
    pub answered: usize,
    pub unanswered: usize,
}

impl ReviewSummary {
    #[must_use]
    pub fn build(questions: &[Question], answers: &BTreeMap<QuestionId, String>) -> Self {
        let items: Vec<ReviewItem> = questions
            .iter()
            .enumerate()
            .map(|(index, question)| ReviewItem {
                index,
                question_id: question.id(),
                prompt: question.prompt().to_owned(),
                answer: answers.get(&question.id()).cloned(),
            })
            .collect();
        let answered = items.iter().filter(|item| item.is_answered()).count();
        Self {
            unanswered: items.len() - answered,
            answered,
            items,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Whole-number percentage of answered questions.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.answered, self.total())
    }

    #[must_use]
    pub fn first_unanswered(&self) -> Option<usize> {
        self.items
            .iter()
            .find(|item| !item.is_answered())
            .map(|item| item.index)
    }
}

/// One cell of the question palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub index: usize,
    pub answered: bool,
    pub current: bool,
}

#[must_use]
pub fn palette(
    questions: &[Question],
    answers: &BTreeMap<QuestionId, String>,
    cursor: usize,
) -> Vec<PaletteEntry> {
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| PaletteEntry {
            index,
            answered: answers.contains_key(&question.id()),
            current: index == cursor,
        })
        .collect()
}

#[must_use]
pub fn progress_percent(answered: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    u8::try_from(answered.min(total) * 100 / total).unwrap_or(100)
}
