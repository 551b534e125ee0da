//! Round-robin pairing with greedy conflict-free selection.
//!
//! Pairing is pure: it only sees positions in the ready list, so it can be
//! tested and benchmarked without a store.

use std::collections::HashSet;

/// One unordered pair of ready players, by position in the ready list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Plays first
    pub player1: usize,
    pub player2: usize,
    /// Selected to play in this round
    pub scheduled: bool,
}

/// Every ordered pair `(a, b)` with `a != b`, in generation order
pub fn ordered_pairs(len: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(len * len.saturating_sub(1));
    for a in 0..len {
        for b in 0..len {
            if a != b {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

/// Plan one round over `players`.
///
/// Ordered pairs are reduced to one candidate per unordered pair, keeping the
/// position of its first occurrence, so `(a, b)` and `(b, a)` become a single
/// match with `a` as player 1. Candidates are then scanned in order and a
/// candidate is scheduled only when neither side is already scheduled.
/// Entries that compare equal are never paired with each other.
pub fn plan_round<T: PartialEq>(players: &[T]) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut booked = HashSet::new();
    let mut candidates = Vec::new();

    for (a, b) in ordered_pairs(players.len()) {
        if players[a] == players[b] || !seen.insert((a.min(b), a.max(b))) {
            continue;
        }

        let scheduled = !booked.contains(&a) && !booked.contains(&b);
        if scheduled {
            booked.insert(a);
            booked.insert(b);
        }
        candidates.push(Candidate {
            player1: a,
            player2: b,
            scheduled,
        });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scheduled(candidates: &[Candidate]) -> Vec<(usize, usize)> {
        candidates
            .iter()
            .filter(|c| c.scheduled)
            .map(|c| (c.player1, c.player2))
            .collect()
    }

    #[test]
    fn test_ordered_pairs_cover_every_permutation() {
        assert_eq!(
            ordered_pairs(3),
            vec![(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)]
        );
        assert!(ordered_pairs(1).is_empty());
        assert!(ordered_pairs(0).is_empty());
    }

    #[test]
    fn test_two_players_make_one_match() {
        let plan = plan_round(&["a", "b"]);
        assert_eq!(
            plan,
            vec![Candidate {
                player1: 0,
                player2: 1,
                scheduled: true
            }]
        );
    }

    #[test]
    fn test_three_players_leave_one_waiting() {
        let plan = plan_round(&["a", "b", "c"]);
        assert_eq!(plan.len(), 3);
        assert_eq!(scheduled(&plan), vec![(0, 1)]);
    }

    #[test]
    fn test_four_players_make_two_disjoint_matches() {
        let plan = plan_round(&["a", "b", "c", "d"]);
        assert_eq!(plan.len(), 6);
        assert_eq!(scheduled(&plan), vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn test_too_few_players() {
        assert!(plan_round::<&str>(&[]).is_empty());
        assert!(plan_round(&["a"]).is_empty());
    }

    #[test]
    fn test_equal_entries_are_never_paired() {
        let plan = plan_round(&["a", "a"]);
        assert!(plan.is_empty());
    }

    proptest! {
        #[test]
        fn test_scheduled_matches_are_disjoint(n in 0usize..40) {
            let players: Vec<usize> = (0..n).collect();
            let plan = plan_round(&players);

            prop_assert_eq!(plan.len(), n * n.saturating_sub(1) / 2);

            let mut booked = HashSet::new();
            for (a, b) in scheduled(&plan) {
                prop_assert!(a != b);
                prop_assert!(booked.insert(a));
                prop_assert!(booked.insert(b));
            }
            prop_assert_eq!(booked.len(), n / 2 * 2);
        }

        #[test]
        fn test_every_unordered_pair_appears_once(n in 2usize..25) {
            let players: Vec<usize> = (0..n).collect();
            let plan = plan_round(&players);

            let mut pairs = HashSet::new();
            for c in &plan {
                prop_assert!(c.player1 < c.player2);
                prop_assert!(pairs.insert((c.player1, c.player2)));
            }
        }
    }
}
