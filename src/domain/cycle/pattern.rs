//! Pattern generation: a shuffled sequence with an exact win count.
//!
//! Generation fails closed. Whatever the shuffle produces is re-counted,
//! and a mismatch is replaced by a deterministic sequence with the right
//! composition, so no caller ever sees a pattern that breaks the quota.

use crate::ports::RandomSource;

use super::{CycleQuota, Outcome};

/// Generates a uniformly shuffled pattern holding exactly `quota.wins()`
/// wins and `quota.losses()` losses.
pub fn generate(quota: CycleQuota, random: &dyn RandomSource) -> Vec<Outcome> {
    let mut pattern = fallback_pattern(quota);
    shuffle(&mut pattern, random);
    finalize(pattern, quota)
}

/// Deterministic pattern with the exact composition: all wins, then all losses.
pub fn fallback_pattern(quota: CycleQuota) -> Vec<Outcome> {
    let mut pattern = Vec::with_capacity(quota.length());
    pattern.extend(std::iter::repeat(Outcome::Win).take(quota.wins()));
    pattern.extend(std::iter::repeat(Outcome::Lose).take(quota.losses()));
    pattern
}

/// Returns true when `pattern` has length N and exactly W wins.
pub fn composition_matches(pattern: &[Outcome], quota: CycleQuota) -> bool {
    pattern.len() == quota.length() && count_wins(pattern) == quota.wins()
}

/// Number of `Win` labels in a sequence.
pub fn count_wins(sequence: &[Outcome]) -> usize {
    sequence.iter().filter(|o| o.is_win()).count()
}

// Fisher-Yates over the full length. Out-of-range draws from a faulty
// source are clamped rather than trusted.
fn shuffle(pattern: &mut [Outcome], random: &dyn RandomSource) {
    for i in (1..pattern.len()).rev() {
        let j = random.below(i + 1);
        pattern.swap(i, j.min(i));
    }
}

fn finalize(pattern: Vec<Outcome>, quota: CycleQuota) -> Vec<Outcome> {
    if composition_matches(&pattern, quota) {
        return pattern;
    }

    tracing::error!(
        length = pattern.len(),
        wins = count_wins(&pattern),
        expected_length = quota.length(),
        expected_wins = quota.wins(),
        "Generated pattern failed composition check, using fallback"
    );
    fallback_pattern(quota)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::random::{ScriptedRandom, ThreadRandom};
    use proptest::prelude::*;

    #[test]
    fn generate_has_exact_composition() {
        let quota = CycleQuota::new(12, 5).unwrap();
        let pattern = generate(quota, &ThreadRandom::new());

        assert_eq!(pattern.len(), 12);
        assert_eq!(count_wins(&pattern), 5);
    }

    #[test]
    fn scripted_source_produces_exact_order() {
        // Always drawing 0 swaps slot i with slot 0 for i = 3, 2, 1.
        // [W, W, L, L] -> i=3: [L, W, L, W] -> i=2: [L, W, L, W] -> i=1: [W, L, L, W]
        let quota = CycleQuota::new(4, 2).unwrap();
        let random = ScriptedRandom::new(vec![0, 0, 0]);

        let pattern = generate(quota, &random);

        assert_eq!(
            pattern,
            vec![Outcome::Win, Outcome::Lose, Outcome::Lose, Outcome::Win]
        );
    }

    #[test]
    fn identity_draws_keep_fallback_order() {
        // Drawing j == i never moves anything.
        let quota = CycleQuota::new(4, 1).unwrap();
        let random = ScriptedRandom::new(vec![3, 2, 1]);

        let pattern = generate(quota, &random);

        assert_eq!(pattern, fallback_pattern(quota));
    }

    #[test]
    fn out_of_range_draws_are_clamped() {
        let quota = CycleQuota::new(6, 3).unwrap();
        let random = ScriptedRandom::new(vec![usize::MAX; 5]);

        let pattern = generate(quota, &random);

        assert!(composition_matches(&pattern, quota));
    }

    #[test]
    fn finalize_replaces_malformed_pattern() {
        let quota = CycleQuota::new(5, 2).unwrap();
        let malformed = vec![Outcome::Win; 5];

        let repaired = finalize(malformed, quota);

        assert_eq!(repaired, fallback_pattern(quota));
        assert!(composition_matches(&repaired, quota));
    }

    #[test]
    fn finalize_replaces_wrong_length_pattern() {
        let quota = CycleQuota::new(5, 2).unwrap();
        let short = vec![Outcome::Win, Outcome::Win, Outcome::Lose];

        assert_eq!(finalize(short, quota), fallback_pattern(quota));
    }

    #[test]
    fn degenerate_quotas_are_supported() {
        let all_lose = CycleQuota::new(3, 0).unwrap();
        assert_eq!(generate(all_lose, &ThreadRandom::new()), vec![Outcome::Lose; 3]);

        let all_win = CycleQuota::new(3, 3).unwrap();
        assert_eq!(generate(all_win, &ThreadRandom::new()), vec![Outcome::Win; 3]);
    }

    proptest! {
        #[test]
        fn generated_patterns_always_match_quota(length in 1usize..64, wins_seed in 0usize..64) {
            let wins = wins_seed % (length + 1);
            let quota = CycleQuota::new(length, wins).unwrap();

            let pattern = generate(quota, &ThreadRandom::new());

            prop_assert!(composition_matches(&pattern, quota));
        }
    }
}
