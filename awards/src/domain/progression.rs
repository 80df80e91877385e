//! Pure XP and level arithmetic.
//!
//! All functions here are total and use exact integer arithmetic; nothing in
//! the progression model needs floating point. `xp_awarded` rounds half-up,
//! matching the documented `round(xp * score / 100)` formula.

/// XP granted for a scored attempt: `round(challenge_xp * score / 100)`.
///
/// `score` is expected in [0, 100]; callers validate before invoking. The
/// result never exceeds `challenge_xp`.
///
/// # Examples
/// ```
/// use awards::domain::progression::xp_awarded;
///
/// assert_eq!(xp_awarded(100, 85), 85);
/// assert_eq!(xp_awarded(250, 33), 83); // 82.5 rounds up
/// assert_eq!(xp_awarded(100, 0), 0);
/// ```
pub fn xp_awarded(challenge_xp: u32, score: u8) -> u32 {
    let scaled = u64::from(challenge_xp) * u64::from(score) + 50;
    u32::try_from(scaled / 100).unwrap_or(u32::MAX)
}

/// Level derived from cumulative XP: `floor(sqrt(total_xp / 100)) + 1`.
///
/// Total and monotone; `total_xp = 0` maps to level 1.
///
/// # Examples
/// ```
/// use awards::domain::progression::level_for_xp;
///
/// assert_eq!(level_for_xp(0), 1);
/// assert_eq!(level_for_xp(100), 2);
/// assert_eq!(level_for_xp(399), 2);
/// assert_eq!(level_for_xp(400), 3);
/// ```
pub fn level_for_xp(total_xp: u64) -> u32 {
    let level = (total_xp / 100).isqrt() + 1;
    u32::try_from(level).unwrap_or(u32::MAX)
}

/// Cumulative XP at which `level` begins: `(level - 1)^2 * 100`.
pub fn xp_for_level(level: u32) -> u64 {
    let base = u64::from(level.saturating_sub(1));
    base * base * 100
}

/// XP still missing from `total_xp` to reach the next level.
pub fn xp_to_next_level(total_xp: u64) -> u64 {
    let next_floor = xp_for_level(level_for_xp(total_xp) + 1);
    next_floor.saturating_sub(total_xp)
}

/// Whether `score` reaches the passing threshold.
pub fn is_passing(score: u8, threshold: u8) -> bool {
    score >= threshold
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(100, 100, 100)]
    #[case(100, 85, 85)]
    #[case(100, 75, 75)]
    #[case(100, 0, 0)]
    #[case(0, 100, 0)]
    #[case(30, 50, 15)]
    #[case(25, 50, 13)] // 12.5 rounds half-up
    #[case(33, 33, 11)] // 10.89 rounds down
    #[case(u32::MAX, 100, u32::MAX)]
    fn xp_awarded_matches_the_rounded_formula(
        #[case] challenge_xp: u32,
        #[case] score: u8,
        #[case] expected: u32,
    ) {
        assert_eq!(xp_awarded(challenge_xp, score), expected);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(99, 1)]
    #[case(100, 2)]
    #[case(399, 2)]
    #[case(400, 3)]
    #[case(900, 4)]
    #[case(1600, 5)]
    #[case(1_000_000, 101)]
    fn level_matches_the_square_root_formula(#[case] total_xp: u64, #[case] expected: u32) {
        assert_eq!(level_for_xp(total_xp), expected);
    }

    #[test]
    fn level_is_monotone_in_total_xp() {
        let mut previous = 0;
        for total in (0..5_000).step_by(7) {
            let level = level_for_xp(total);
            assert!(level >= previous, "level regressed at total_xp={total}");
            previous = level;
        }
    }

    #[rstest]
    #[case(1, 0)]
    #[case(2, 100)]
    #[case(3, 400)]
    #[case(4, 900)]
    fn xp_for_level_inverts_the_level_formula(#[case] level: u32, #[case] expected: u64) {
        assert_eq!(xp_for_level(level), expected);
    }

    #[rstest]
    #[case(0, 100)]
    #[case(85, 15)]
    #[case(100, 300)] // level 2 spans [100, 400)
    #[case(950, 650)]
    fn xp_to_next_level_counts_down_within_the_band(
        #[case] total_xp: u64,
        #[case] expected: u64,
    ) {
        assert_eq!(xp_to_next_level(total_xp), expected);
    }

    #[test]
    fn xp_to_next_level_is_never_zero() {
        for total in 0..2_000 {
            assert!(xp_to_next_level(total) > 0, "stalled at total_xp={total}");
        }
    }

    #[rstest]
    #[case(70, 70, true)]
    #[case(85, 70, true)]
    #[case(69, 70, false)]
    #[case(80, 80, true)]
    #[case(79, 80, false)]
    fn passing_compares_against_the_threshold(
        #[case] score: u8,
        #[case] threshold: u8,
        #[case] expected: bool,
    ) {
        assert_eq!(is_passing(score, threshold), expected);
    }
}
