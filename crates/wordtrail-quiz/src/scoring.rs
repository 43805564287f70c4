//! Score shown on the summary screen.

use serde::Serialize;

const POINTS_PER_HEART: u32 = 100;
const TIME_BONUS: i64 = 500;
const TIME_PENALTY_PER_SECOND: i64 = 10;
const THREE_STARS: u32 = 400;
const TWO_STARS: u32 = 250;

/// Points and stars for a passed quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizScore {
    /// Total points.
    pub points: u32,
    /// One to three stars.
    pub stars: u8,
}

/// Scores a quiz from the health left and the unpaused seconds spent.
///
/// `points = health * 100 + max(0, 500 - round(elapsed) * 10)`; three stars
/// from 400 points, two from 250, otherwise one.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score(health: u8, elapsed_seconds: f64) -> QuizScore {
    let seconds = elapsed_seconds.max(0.0).round() as i64;
    let time_bonus = (TIME_BONUS - seconds.saturating_mul(TIME_PENALTY_PER_SECOND)).max(0) as u32;
    let points = u32::from(health) * POINTS_PER_HEART + time_bonus;
    let stars = if points >= THREE_STARS {
        3
    } else if points >= TWO_STARS {
        2
    } else {
        1
    };
    QuizScore { points, stars }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_perfect_run_scores_three_stars() {
        let result = score(5, 10.0);

        assert_eq!(result, QuizScore { points: 900, stars: 3 });
    }

    #[test]
    fn test_time_bonus_never_goes_negative() {
        let result = score(1, 120.0);

        assert_eq!(result, QuizScore { points: 100, stars: 1 });
    }

    #[test]
    fn test_star_thresholds() {
        assert_eq!(score(4, 50.0).stars, 3);
        assert_eq!(score(2, 45.0).stars, 2);
        assert_eq!(score(2, 46.0).stars, 1);
    }

    #[test]
    fn test_elapsed_is_rounded_to_whole_seconds() {
        assert_eq!(score(0, 10.4).points, 400);
        assert_eq!(score(0, 10.5).points, 390);
    }
}
