use rand::rngs::StdRng;
use rand::{seq::SliceRandom, Rng, SeedableRng};

/// Bounds on how many questions a single attempt draws from the bank.
/// Exams with fewer questions than the lower bound use everything they have.
pub(crate) const DRAW_MIN_QUESTIONS: usize = 40;
pub(crate) const DRAW_MAX_QUESTIONS: usize = 60;

/// Fresh unseeded generator for one attempt. The persisted manifest, not a
/// seed, is what makes an attempt reproducible, so every call must draw
/// independently.
pub(crate) fn attempt_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Picks the number of questions to draw for an exam holding `available`
/// questions: uniform in `[min(40, available), min(60, available)]`.
pub(crate) fn draw_target<R: Rng>(rng: &mut R, available: usize) -> usize {
    let lower = DRAW_MIN_QUESTIONS.min(available);
    let upper = DRAW_MAX_QUESTIONS.min(available);
    if lower == upper {
        return upper;
    }
    rng.gen_range(lower..=upper)
}

/// Uniform subset in uniform order: Fisher-Yates over the whole list, then
/// keep the first `count` entries.
pub(crate) fn choose_subset<T, R: Rng>(rng: &mut R, mut items: Vec<T>, count: usize) -> Vec<T> {
    items.shuffle(rng);
    items.truncate(count);
    items
}

/// Independent permutation of one question's option ids.
pub(crate) fn shuffle_order<R: Rng>(rng: &mut R, mut ids: Vec<String>) -> Vec<String> {
    ids.shuffle(rng);
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("q-{i}")).collect()
    }

    #[test]
    fn draw_target_respects_bounds() {
        let mut rng = attempt_rng();
        for available in [1, 10, 39, 40, 41, 55, 60, 61, 100, 500] {
            for _ in 0..50 {
                let target = draw_target(&mut rng, available);
                assert!(target >= DRAW_MIN_QUESTIONS.min(available));
                assert!(target <= DRAW_MAX_QUESTIONS.min(available));
            }
        }
    }

    #[test]
    fn small_exam_draws_everything() {
        let mut rng = attempt_rng();
        for available in [1, 7, 39, 40] {
            assert_eq!(draw_target(&mut rng, available), available);
        }
    }

    #[test]
    fn draw_target_zero_questions() {
        let mut rng = attempt_rng();
        assert_eq!(draw_target(&mut rng, 0), 0);
    }

    #[test]
    fn choose_subset_returns_distinct_items_from_source() {
        let mut rng = attempt_rng();
        let source = ids(100);
        let chosen = choose_subset(&mut rng, source.clone(), 45);

        assert_eq!(chosen.len(), 45);
        let unique: HashSet<&String> = chosen.iter().collect();
        assert_eq!(unique.len(), 45);
        let pool: HashSet<&String> = source.iter().collect();
        assert!(chosen.iter().all(|id| pool.contains(id)));
    }

    #[test]
    fn choose_subset_with_count_above_len_keeps_all() {
        let mut rng = attempt_rng();
        let chosen = choose_subset(&mut rng, ids(5), 10);
        assert_eq!(chosen.len(), 5);
    }

    #[test]
    fn shuffle_order_is_a_permutation() {
        let mut rng = attempt_rng();
        let original = ids(20);
        let shuffled = shuffle_order(&mut rng, original.clone());

        assert_eq!(shuffled.len(), original.len());
        let mut sorted_original = original;
        let mut sorted_shuffled = shuffled;
        sorted_original.sort();
        sorted_shuffled.sort();
        assert_eq!(sorted_original, sorted_shuffled);
    }

    #[test]
    fn repeated_draws_are_not_all_identical() {
        // Statistical check on independence between attempts: 30 draws of 40
        // from 100 collapsing to one ordering would mean a shared or fixed
        // seed.
        let source = ids(100);
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        for _ in 0..30 {
            let mut rng = attempt_rng();
            let target = draw_target(&mut rng, source.len());
            let drawn = choose_subset(&mut rng, source.clone(), target);
            seen.insert(drawn);
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn seeded_rng_reproduces_a_draw() {
        let source = ids(80);
        let mut first = StdRng::seed_from_u64(17);
        let mut second = StdRng::seed_from_u64(17);

        let target_a = draw_target(&mut first, source.len());
        let target_b = draw_target(&mut second, source.len());
        assert_eq!(target_a, target_b);
        assert_eq!(
            choose_subset(&mut first, source.clone(), target_a),
            choose_subset(&mut second, source, target_b),
        );
    }
}
