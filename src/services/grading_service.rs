use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeSummary {
    pub total_questions: i32,
    pub correct_answers: i32,
    pub score: f64,
}

pub struct GradingService;

impl GradingService {
    /// Grades a submission against a test's question set.
    ///
    /// `questions` yields `(question_id, correct_answer)` pairs in test
    /// order; `answers` maps question ids rendered as text to the learner's
    /// raw answer. Absent answers default to the empty string and never
    /// match. The band score is the continuous mapping
    /// `correct / total * 9.0`, or `0.0` for an empty question set.
    pub fn grade<'a>(
        questions: impl IntoIterator<Item = (Uuid, &'a str)>,
        answers: &HashMap<String, String>,
    ) -> GradeSummary {
        let mut total: i32 = 0;
        let mut correct: i32 = 0;

        for (question_id, correct_answer) in questions {
            total += 1;
            let user_answer = answers
                .get(&question_id.to_string())
                .map(String::as_str)
                .unwrap_or("");
            if Self::is_match(user_answer, correct_answer) {
                correct += 1;
            }
        }

        GradeSummary {
            total_questions: total,
            correct_answers: correct,
            score: Self::band_score(correct, total),
        }
    }

    /// Comparison trims surrounding whitespace and lower-cases both sides.
    /// Internal whitespace and punctuation are significant.
    pub fn is_match(user_answer: &str, correct_answer: &str) -> bool {
        normalize(user_answer) == normalize(correct_answer)
    }

    pub fn band_score(correct: i32, total: i32) -> f64 {
        if total > 0 {
            (correct as f64 / total as f64) * 9.0
        } else {
            0.0
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&Uuid, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(id, ans)| (id.to_string(), ans.to_string()))
            .collect()
    }

    #[test]
    fn comparison_ignores_case_and_surrounding_whitespace() {
        assert!(GradingService::is_match(" Paris ", "paris"));
        assert!(GradingService::is_match("TRUE", "True"));
        assert!(GradingService::is_match("\t2020\n", "2020"));
    }

    #[test]
    fn internal_whitespace_is_significant() {
        assert!(!GradingService::is_match("new  york", "new york"));
        assert!(!GradingService::is_match("newyork", "new york"));
    }

    #[test]
    fn four_question_scenario() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let correct = ["A", "True", "2020", "Paris"];
        let submitted = answers(&[
            (&ids[0], "a"),
            (&ids[1], "TRUE"),
            (&ids[2], "2021"),
            (&ids[3], "paris"),
        ]);

        let summary = GradingService::grade(
            ids.iter().copied().zip(correct.iter().copied()),
            &submitted,
        );

        assert_eq!(summary.total_questions, 4);
        assert_eq!(summary.correct_answers, 3);
        assert_eq!(summary.score, 6.75);
    }

    #[test]
    fn empty_question_set_scores_zero() {
        let submitted = HashMap::new();
        let summary = GradingService::grade(std::iter::empty(), &submitted);
        assert_eq!(summary.total_questions, 0);
        assert_eq!(summary.correct_answers, 0);
        assert_eq!(summary.score, 0.0);
    }

    #[test]
    fn missing_answers_never_count_as_correct() {
        let id = Uuid::new_v4();
        let summary = GradingService::grade([(id, "Paris")], &HashMap::new());
        assert_eq!(summary.total_questions, 1);
        assert_eq!(summary.correct_answers, 0);
        assert_eq!(summary.score, 0.0);
    }

    #[test]
    fn empty_correct_answer_matches_missing_answer_only_when_blank() {
        // A blank correct answer would be matched by an absent submission
        // entry; administrators are expected not to author those, but the
        // grader still behaves deterministically.
        let id = Uuid::new_v4();
        let summary = GradingService::grade([(id, "")], &HashMap::new());
        assert_eq!(summary.correct_answers, 1);
    }

    #[test]
    fn unknown_keys_in_submission_are_ignored() {
        let id = Uuid::new_v4();
        let mut submitted = HashMap::new();
        submitted.insert("not-a-question".to_string(), "Paris".to_string());
        submitted.insert(Uuid::new_v4().to_string(), "Paris".to_string());
        let summary = GradingService::grade([(id, "Paris")], &submitted);
        assert_eq!(summary.correct_answers, 0);
    }

    #[test]
    fn correct_count_never_exceeds_total() {
        let ids: Vec<Uuid> = (0..10).map(|_| Uuid::new_v4()).collect();
        let submitted = answers(&ids.iter().map(|id| (id, "yes")).collect::<Vec<_>>());
        let summary = GradingService::grade(
            ids.iter().map(|id| (*id, "yes")),
            &submitted,
        );
        assert_eq!(summary.correct_answers, 10);
        assert!(summary.correct_answers <= summary.total_questions);
        assert_eq!(summary.score, 9.0);
    }

    #[test]
    fn grading_is_deterministic_across_calls() {
        let id = Uuid::new_v4();
        let submitted = answers(&[(&id, "paris")]);
        let first = GradingService::grade([(id, "Paris")], &submitted);
        let second = GradingService::grade([(id, "Paris")], &submitted);
        assert_eq!(first, second);
    }
}
