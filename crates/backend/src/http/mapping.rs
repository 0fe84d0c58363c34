//! Wire shapes for the REST API and their conversion into domain types.

use quiz_core::model::{
    AnswerOption, CourseId, OptionId, Question, QuestionId, Quiz, QuizId, TopicId, TopicRef,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuizDto {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub proctored: Option<bool>,
    #[serde(default)]
    pub topic: Option<TopicDto>,
    #[serde(default)]
    pub course_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TopicDto {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionDto {
    pub id: u64,
    pub question_text: String,
    #[serde(default)]
    pub answers: Vec<OptionDto>,
    #[serde(default)]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OptionDto {
    pub id: u64,
    pub option_text: String,
}

impl QuizDto {
    pub(crate) fn into_quiz(self) -> Quiz {
        let mut quiz = Quiz::new(QuizId::new(self.id), self.title, self.duration)
            .with_proctored(self.proctored.unwrap_or(true));
        if let Some(topic) = self.topic {
            quiz = quiz.with_topic(TopicRef {
                id: TopicId::new(topic.id),
                name: topic.name,
                course_id: topic.course_id.map(CourseId::new),
            });
        }
        if let Some(course_id) = self.course_id {
            quiz = quiz.with_course(CourseId::new(course_id));
        }
        quiz
    }
}

impl QuestionDto {
    pub(crate) fn into_question(self) -> Question {
        let options = self
            .answers
            .into_iter()
            .map(|option| AnswerOption::new(OptionId::new(option.id), option.option_text))
            .collect();
        let question = Question::new(QuestionId::new(self.id), self.question_text, options);
        match self.correct_answer {
            Some(answer) if !answer.is_empty() => question.with_correct_answer(answer),
            _ => question,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_defaults_when_fields_missing() {
        let dto: QuizDto = serde_json::from_str(r#"{"id": 4, "title": "Traits"}"#).unwrap();
        let quiz = dto.into_quiz();
        assert_eq!(quiz.id(), QuizId::new(4));
        assert_eq!(quiz.duration_minutes(), 10);
        assert!(quiz.proctored());
        assert!(quiz.topic().is_none());
    }

    #[test]
    fn quiz_maps_topic_and_course() {
        let dto: QuizDto = serde_json::from_str(
            r#"{"id": 4, "title": "Traits", "duration": 15, "proctored": false,
                "topic": {"id": 2, "name": "Generics", "courseId": 9}}"#,
        )
        .unwrap();
        let quiz = dto.into_quiz();
        assert_eq!(quiz.duration_secs(), 900);
        assert!(!quiz.proctored());
        assert_eq!(quiz.topic().map(|t| t.name.as_str()), Some("Generics"));
        assert_eq!(quiz.course_id(), Some(CourseId::new(9)));
    }

    #[test]
    fn question_keeps_option_order() {
        let dto: QuestionDto = serde_json::from_str(
            r#"{"id": 1, "questionText": "Pick one",
                "answers": [{"id": 7, "optionText": "b"}, {"id": 3, "optionText": "a"}],
                "correctAnswer": ""}"#,
        )
        .unwrap();
        let question = dto.into_question();
        let texts: Vec<&str> = question.options().iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "a"]);
        assert_eq!(question.correct_answer(), None);
    }
}
