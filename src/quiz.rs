// Copyright (c) 2026 rezky_nightky

use tracing::info;

use crate::collab::QuizGate;

pub struct Question {
    pub prompt: &'static str,
    pub options: [&'static str; 4],
    pub correct: usize,
}

pub const QUESTION_COUNT: usize = 5;

pub const QUESTIONS: [Question; QUESTION_COUNT] = [
    Question {
        prompt: "What is evaporation?",
        options: [
            "Water turning into clouds",
            "Water turning into vapor because of the sun's heat",
            "Water falling to the ground",
            "Water flowing along a river",
        ],
        correct: 1,
    },
    Question {
        prompt: "What do clouds do in the water cycle?",
        options: [
            "Gather water vapor and form rain",
            "Evaporate water from the sea",
            "Carry water to the sea",
            "Soak up water from the soil",
        ],
        correct: 0,
    },
    Question {
        prompt: "What is it called when water vapor turns into clouds?",
        options: ["Evaporation", "Precipitation", "Condensation", "Collection"],
        correct: 2,
    },
    Question {
        prompt: "Where does the water cycle begin?",
        options: [
            "In the air",
            "In the seas and oceans",
            "On the mountains",
            "In the forest",
        ],
        correct: 1,
    },
    Question {
        prompt: "What happens during precipitation?",
        options: [
            "Water rises into the sky",
            "Water falls to earth as rain",
            "Water evaporates from the sea",
            "Water flows into rivers",
        ],
        correct: 1,
    },
];

/// Rounded share of correct answers, `0..=100`.
pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (score as f32 * 100.0 / total as f32).round() as u32
}

pub fn grade(percent: u32) -> &'static str {
    match percent {
        100.. => "Perfect! You are a water cycle expert!",
        80..=99 => "Excellent! You understand the water cycle very well!",
        60..=79 => "Good! You understand the water cycle fairly well.",
        40..=59 => "Try again! Watch the animation more closely.",
        _ => "Don't give up! Study the water cycle once more.",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Closed,
    Asking,
    Result { score: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizInput {
    /// Pick option `0..4` for the question under the cursor.
    Choose(usize),
    Prev,
    Next,
    Submit,
    Retry,
    Close,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizExit {
    /// The quiz was opened by a finished cycle and should hand control back.
    pub resume: bool,
}

#[derive(Clone, Debug)]
pub struct Quiz {
    stage: Stage,
    answers: [Option<usize>; QUESTION_COUNT],
    cursor: usize,
    gated: bool,
}

impl Default for Quiz {
    fn default() -> Self {
        Self::new()
    }
}

impl Quiz {
    pub fn new() -> Self {
        Self {
            stage: Stage::Closed,
            answers: [None; QUESTION_COUNT],
            cursor: 0,
            gated: false,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_open(&self) -> bool {
        self.stage != Stage::Closed
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn answer(&self, question: usize) -> Option<usize> {
        self.answers.get(question).copied().flatten()
    }

    pub fn open(&mut self, gated: bool) {
        self.answers = [None; QUESTION_COUNT];
        self.cursor = 0;
        self.gated = self.gated || gated;
        self.stage = Stage::Asking;
    }

    pub fn score(&self) -> usize {
        QUESTIONS
            .iter()
            .zip(self.answers)
            .filter(|(q, a)| *a == Some(q.correct))
            .count()
    }

    pub fn apply(&mut self, input: QuizInput) -> Option<QuizExit> {
        match (self.stage, input) {
            (Stage::Closed, _) => None,
            (_, QuizInput::Close) => Some(self.close(false)),
            (Stage::Asking, QuizInput::Choose(i)) => {
                if i < QUESTIONS[self.cursor].options.len() {
                    self.answers[self.cursor] = Some(i);
                    self.cursor = (self.cursor + 1).min(QUESTIONS.len() - 1);
                }
                None
            }
            (Stage::Asking, QuizInput::Prev) => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            (Stage::Asking, QuizInput::Next) => {
                self.cursor = (self.cursor + 1).min(QUESTIONS.len() - 1);
                None
            }
            (Stage::Asking, QuizInput::Submit) => {
                let score = self.score();
                info!(
                    score,
                    percent = percentage(score, QUESTIONS.len()),
                    "quiz submitted"
                );
                self.stage = Stage::Result { score };
                None
            }
            (Stage::Result { .. }, QuizInput::Retry) => {
                let gated = self.gated;
                self.open(gated);
                None
            }
            (Stage::Result { .. }, QuizInput::Submit) => Some(self.close(self.gated)),
            _ => None,
        }
    }

    fn close(&mut self, resume: bool) -> QuizExit {
        self.stage = Stage::Closed;
        self.gated = false;
        QuizExit { resume }
    }
}

impl QuizGate for Quiz {
    fn on_cycle_complete(&mut self) {
        if self.is_open() {
            self.gated = true;
        } else {
            self.open(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer_all(quiz: &mut Quiz, picks: [usize; 5]) {
        for p in picks {
            quiz.apply(QuizInput::Choose(p));
        }
    }

    #[test]
    fn grades_follow_percentage_bands() {
        assert_eq!(percentage(5, 5), 100);
        assert_eq!(percentage(4, 5), 80);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
        assert!(grade(100).starts_with("Perfect"));
        assert!(grade(80).starts_with("Excellent"));
        assert!(grade(60).starts_with("Good"));
        assert!(grade(40).starts_with("Try"));
        assert!(grade(20).starts_with("Don't"));
    }

    #[test]
    fn full_marks_then_finish_resumes_a_gated_quiz() {
        let mut quiz = Quiz::new();
        quiz.on_cycle_complete();
        assert_eq!(quiz.stage(), Stage::Asking);
        answer_all(&mut quiz, [1, 0, 2, 1, 1]);
        assert_eq!(quiz.apply(QuizInput::Submit), None);
        assert_eq!(quiz.stage(), Stage::Result { score: 5 });
        assert_eq!(
            quiz.apply(QuizInput::Submit),
            Some(QuizExit { resume: true })
        );
        assert!(!quiz.is_open());
    }

    #[test]
    fn manual_quiz_does_not_resume() {
        let mut quiz = Quiz::new();
        quiz.open(false);
        quiz.apply(QuizInput::Submit);
        assert_eq!(quiz.stage(), Stage::Result { score: 0 });
        assert_eq!(
            quiz.apply(QuizInput::Submit),
            Some(QuizExit { resume: false })
        );
    }

    #[test]
    fn unanswered_and_wrong_answers_score_nothing() {
        let mut quiz = Quiz::new();
        quiz.open(false);
        quiz.apply(QuizInput::Choose(1));
        quiz.apply(QuizInput::Choose(3));
        assert_eq!(quiz.score(), 1);
        assert_eq!(quiz.cursor(), 2);
        quiz.apply(QuizInput::Choose(9));
        assert_eq!(quiz.answer(2), None);
    }

    #[test]
    fn cursor_moves_and_reanswers() {
        let mut quiz = Quiz::new();
        quiz.open(false);
        quiz.apply(QuizInput::Choose(0));
        quiz.apply(QuizInput::Prev);
        quiz.apply(QuizInput::Choose(1));
        assert_eq!(quiz.answer(0), Some(1));
        for _ in 0..10 {
            quiz.apply(QuizInput::Next);
        }
        assert_eq!(quiz.cursor(), 4);
    }

    #[test]
    fn retry_clears_answers_and_keeps_the_gate() {
        let mut quiz = Quiz::new();
        quiz.on_cycle_complete();
        answer_all(&mut quiz, [1, 0, 0, 0, 0]);
        quiz.apply(QuizInput::Submit);
        quiz.apply(QuizInput::Retry);
        assert_eq!(quiz.stage(), Stage::Asking);
        assert_eq!(quiz.score(), 0);
        quiz.apply(QuizInput::Submit);
        assert_eq!(
            quiz.apply(QuizInput::Submit),
            Some(QuizExit { resume: true })
        );
    }

    #[test]
    fn close_never_resumes_and_closed_quiz_ignores_input() {
        let mut quiz = Quiz::new();
        assert_eq!(quiz.apply(QuizInput::Submit), None);
        quiz.on_cycle_complete();
        assert_eq!(
            quiz.apply(QuizInput::Close),
            Some(QuizExit { resume: false })
        );
        quiz.open(false);
        assert_eq!(quiz.apply(QuizInput::Submit), None);
        assert_eq!(
            quiz.apply(QuizInput::Submit),
            Some(QuizExit { resume: false })
        );
    }
}
