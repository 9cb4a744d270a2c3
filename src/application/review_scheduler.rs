// src/application/review_scheduler.rs
//
// Linear review schedule. `good` waits (review_count + 1) days, `bad` half a
// day; both advance review_count, which therefore counts attempts.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::REVIEW_BASE_INTERVAL_HOURS;
use crate::domain::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    Good,
    Bad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub next_review_at: DateTime<Utc>,
    pub review_count: u32,
}

fn base_interval() -> Duration {
    Duration::hours(REVIEW_BASE_INTERVAL_HOURS)
}

/// Interval a rating would schedule for a question with `review_count` reviews.
/// Saturates at `Duration::MAX` for counts too large to represent.
pub fn interval_for(review_count: u32, outcome: ReviewOutcome) -> Duration {
    match outcome {
        ReviewOutcome::Bad => base_interval() / 2,
        ReviewOutcome::Good => i32::try_from(i64::from(review_count) + 1)
            .ok()
            .and_then(|factor| base_interval().checked_mul(factor))
            .unwrap_or(Duration::MAX),
    }
}

/// Next due time and count after a rating; the due time clamps to the latest
/// representable instant.
pub fn rate(question: &Question, outcome: ReviewOutcome, now: DateTime<Utc>) -> ReviewUpdate {
    let interval = interval_for(question.review_count, outcome);
    ReviewUpdate {
        next_review_at: now
            .checked_add_signed(interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
        review_count: question.review_count.saturating_add(1),
    }
}

/// `(bad, good)` intervals shown next to the rating buttons.
pub fn preview_intervals(question: &Question) -> (Duration, Duration) {
    (
        interval_for(question.review_count, ReviewOutcome::Bad),
        interval_for(question.review_count, ReviewOutcome::Good),
    )
}

/// Questions due at `now`, most overdue first. Ties keep store order.
pub fn due_set(questions: &[Question], now: DateTime<Utc>) -> Vec<&Question> {
    let mut due: Vec<&Question> = questions.iter().filter(|q| q.is_due(now)).collect();
    due.sort_by_key(|q| q.next_review_at);
    due
}

pub fn due_count(questions: &[Question], now: DateTime<Utc>) -> usize {
    questions.iter().filter(|q| q.is_due(now)).count()
}

/// The single card presented for rating.
pub fn current_card(questions: &[Question], now: DateTime<Utc>) -> Option<&Question> {
    due_set(questions, now).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::question;
    use rstest::rstest;

    #[test]
    fn given_bad_rating_on_third_review_when_rating_then_advances_count_and_waits_half_day() {
        // Arrange
        let now = Utc::now();
        let mut q = question("q");
        q.review_count = 3;

        // Act
        let update = rate(&q, ReviewOutcome::Bad, now);

        // Assert
        assert_eq!(update.review_count, 4);
        assert_eq!(update.next_review_at, now + Duration::hours(12));
    }

    #[test]
    fn given_good_rating_on_new_question_when_rating_then_waits_one_day() {
        let now = Utc::now();
        let q = question("q");

        let update = rate(&q, ReviewOutcome::Good, now);

        assert_eq!(update.review_count, 1);
        assert_eq!(update.next_review_at, now + Duration::days(1));
    }

    #[test]
    fn given_good_rating_after_four_reviews_when_rating_then_grows_linearly() {
        let now = Utc::now();
        let mut q = question("q");
        q.review_count = 4;

        let update = rate(&q, ReviewOutcome::Good, now);

        assert_eq!(update.next_review_at, now + Duration::days(5));
    }

    #[rstest]
    #[case(200_000_000)]
    #[case(i32::MAX as u32)]
    #[case(u32::MAX)]
    fn given_huge_review_count_when_rating_good_then_clamps_instead_of_overflowing(
        #[case] review_count: u32,
    ) {
        // Arrange
        let now = Utc::now();
        let mut q = question("q");
        q.review_count = review_count;

        // Act
        let update = rate(&q, ReviewOutcome::Good, now);

        // Assert
        assert_eq!(update.next_review_at, DateTime::<Utc>::MAX_UTC);
        assert_eq!(update.review_count, review_count.saturating_add(1));
    }

    #[test]
    fn given_mixed_questions_when_computing_due_set_then_orders_most_overdue_first() {
        // Arrange
        let now = Utc::now();
        let mut a = question("a");
        a.next_review_at = now - Duration::hours(1);
        let mut b = question("b");
        b.next_review_at = now - Duration::days(3);
        let mut c = question("c");
        c.next_review_at = now + Duration::hours(1);
        let questions = vec![a, b, c];

        // Act
        let due = due_set(&questions, now);

        // Assert
        let ids: Vec<&str> = due.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(current_card(&questions, now).map(|q| q.id.as_str()), Some("b"));
        assert_eq!(due_count(&questions, now), 2);
    }

    #[test]
    fn given_question_when_previewing_then_returns_bad_and_good_intervals() {
        let mut q = question("q");
        q.review_count = 1;

        let (bad, good) = preview_intervals(&q);

        assert_eq!(bad, Duration::hours(12));
        assert_eq!(good, Duration::days(2));
    }
}
