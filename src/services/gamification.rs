// Gamification - level derived from how many posts a user has written

use serde::Serialize;

/// `(minimum posts, level, description)`, ascending.
const LEVELS: &[(i64, i64, &str)] = &[
    (0, 1, "new user"),
    (5, 2, "contributor"),
    (15, 3, "active explorer"),
    (30, 4, "storyteller"),
    (60, 5, "trendsetter"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GamificationLevel {
    pub level: i64,
    pub description: &'static str,
}

impl GamificationLevel {
    pub fn for_post_count(posts: i64) -> Self {
        let (_, level, description) = LEVELS
            .iter()
            .rev()
            .find(|(min, _, _)| posts >= *min)
            .copied()
            .unwrap_or(LEVELS[0]);
        Self { level, description }
    }

    /// Stored levels outside the table clamp to its ends.
    pub fn from_level(level: i64) -> Self {
        let (_, level, description) = LEVELS
            .iter()
            .rev()
            .find(|(_, l, _)| level >= *l)
            .copied()
            .unwrap_or(LEVELS[0]);
        Self { level, description }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(GamificationLevel::for_post_count(0).level, 1);
        assert_eq!(GamificationLevel::for_post_count(4).level, 1);
        assert_eq!(GamificationLevel::for_post_count(5).level, 2);
        assert_eq!(GamificationLevel::for_post_count(15).description, "active explorer");
        assert_eq!(GamificationLevel::for_post_count(59).level, 4);
        assert_eq!(GamificationLevel::for_post_count(1_000).description, "trendsetter");
    }

    #[test]
    fn stored_levels_round_trip() {
        assert_eq!(GamificationLevel::from_level(3).description, "active explorer");
        assert_eq!(GamificationLevel::from_level(0).level, 1);
        assert_eq!(GamificationLevel::from_level(9).level, 5);
    }
}
