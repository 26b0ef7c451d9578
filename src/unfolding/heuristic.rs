use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    marking::{PlaceIndex, PlaceSet},
    unfolding::unfolding_net::UnfoldingNet,
};

/// The estimate of a target that no sequence of transitions can mark.
pub const UNREACHABLE: u64 = u64::MAX;

/**
 * A lower bound on the cost of marking a set of target places, starting from a marking.
 *
 * A single place costs nothing if it is marked, and otherwise the cheapest producing transition plus the
 * estimate of that transition's input places. A set of places costs the maximum of its places, as the
 * places may share their history. A place that is needed while it is being estimated itself closes a cycle;
 * that branch is unreachable.
 *
 * Estimates are memoised per marking and target, except when they were cut short by a cycle further up,
 * as then they depend on the path by which they were reached.
 */
pub struct HeuristicEstimator<'a> {
    net: &'a UnfoldingNet,
    memo: FxHashMap<PlaceSet, FxHashMap<PlaceSet, u64>>,
    evaluations: usize,
    memo_hits: usize,
}

impl<'a> HeuristicEstimator<'a> {
    pub fn new(net: &'a UnfoldingNet) -> Self {
        Self {
            net,
            memo: FxHashMap::default(),
            evaluations: 0,
            memo_hits: 0,
        }
    }

    pub fn estimate(&mut self, marking: &PlaceSet, target: &PlaceSet) -> u64 {
        let mut in_progress = FxHashSet::default();
        self.estimate_guarded(marking, target, &mut in_progress).0
    }

    pub fn get_number_of_evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn get_number_of_memo_hits(&self) -> usize {
        self.memo_hits
    }

    /**
     * Returns the estimate and whether a cycle guard was hit while computing it.
     */
    fn estimate_guarded(
        &mut self,
        marking: &PlaceSet,
        target: &PlaceSet,
        in_progress: &mut FxHashSet<PlaceIndex>,
    ) -> (u64, bool) {
        if target.is_subset_of(marking) {
            return (0, false);
        }
        if let Some(estimate) = self.memo.get(marking).and_then(|targets| targets.get(target)) {
            self.memo_hits += 1;
            return (*estimate, false);
        }
        self.evaluations += 1;

        let mut result = 0;
        let mut guarded = false;
        for place in target.iter().filter(|place| !marking.contains(*place)) {
            let (estimate, place_guarded) = self.estimate_place(marking, place, in_progress);
            result = result.max(estimate);
            guarded |= place_guarded;
            if result == UNREACHABLE && !guarded {
                break;
            }
        }

        if !guarded || in_progress.is_empty() {
            self.memo.entry(marking.clone()).or_default().insert(target.clone(), result);
        }
        (result, guarded)
    }

    fn estimate_place(
        &mut self,
        marking: &PlaceSet,
        place: PlaceIndex,
        in_progress: &mut FxHashSet<PlaceIndex>,
    ) -> (u64, bool) {
        if in_progress.contains(&place) {
            return (UNREACHABLE, true);
        }
        in_progress.insert(place);

        let mut result = UNREACHABLE;
        let mut guarded = false;
        let net = self.net;
        for transition in net.get_producers(place) {
            let inputs = net.get_input_place_set(*transition);
            let (estimate, transition_guarded) = self.estimate_guarded(marking, &inputs, in_progress);
            result = result.min(net.get_cost(*transition).saturating_add(estimate));
            guarded |= transition_guarded;
        }

        in_progress.remove(&place);
        (result, guarded)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::{
        ebi_objects::synchronous_product_net::SynchronousProductNet,
        marking::PlaceSet,
        techniques::state_space_align::StateSpaceAlign,
        tests::{random_safe_net, reachable_markings},
        unfolding::unfolding_net::UnfoldingNet,
    };

    use super::{HeuristicEstimator, UNREACHABLE};

    fn net(file: &str) -> UnfoldingNet {
        let fin = fs::read_to_string(file).unwrap();
        UnfoldingNet::new(&fin.parse::<SynchronousProductNet>().unwrap()).unwrap()
    }

    #[test]
    fn two_paths_estimates() {
        let net = net("testfiles/two-paths.spn");
        let target = net.get_accepting_target();
        let mut heuristic = HeuristicEstimator::new(&net);

        assert_eq!(heuristic.estimate(&PlaceSet::from_places(5, [0]), &target), 2);
        assert_eq!(heuristic.estimate(&PlaceSet::from_places(5, [1]), &target), 1);
        assert_eq!(heuristic.estimate(&PlaceSet::from_places(5, [2]), &target), 1);
        assert_eq!(heuristic.estimate(&PlaceSet::from_places(5, [4]), &target), 0);

        //memoised
        assert_eq!(heuristic.estimate(&PlaceSet::from_places(5, [0]), &target), 2);
        assert!(heuristic.get_number_of_memo_hits() > 0);
    }

    #[test]
    fn cycle_guard() {
        let net = net("testfiles/loop.spn");
        let target = net.get_accepting_target();
        let mut heuristic = HeuristicEstimator::new(&net);

        assert_eq!(heuristic.estimate(&PlaceSet::from_places(4, [0]), &target), 2);
        assert_eq!(heuristic.estimate(&PlaceSet::from_places(4, [1]), &target), 2);
        assert_eq!(heuristic.estimate(&PlaceSet::from_places(4, [2]), &target), 0);
    }

    #[test]
    fn unreachable() {
        let net = net("testfiles/disconnected.spn");
        let target = net.get_accepting_target();
        let mut heuristic = HeuristicEstimator::new(&net);

        assert_eq!(heuristic.estimate(&PlaceSet::from_places(5, [0]), &target), UNREACHABLE);
        assert_eq!(heuristic.estimate(&PlaceSet::from_places(5, [1]), &target), UNREACHABLE);
        assert_eq!(heuristic.estimate(&PlaceSet::from_places(5, [2]), &target), 1);
    }

    #[test]
    fn concurrent_targets_take_maximum() {
        let net = net("testfiles/trace-ab-model-ac.spn");
        let target = net.get_accepting_target();
        let mut heuristic = HeuristicEstimator::new(&net);

        //log b (1) and model c (1) are independent; their maximum is a lower bound on the sum
        assert_eq!(heuristic.estimate(&PlaceSet::from_places(7, [1, 4]), &target), 1);
        assert_eq!(heuristic.estimate(&PlaceSet::from_places(7, [0, 3]), &target), 1);
        assert_eq!(heuristic.estimate(&PlaceSet::from_places(7, [2, 5]), &target), 0);
    }

    #[test]
    fn admissible_on_random_nets() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            let spn = random_safe_net(&mut rng);
            let net = UnfoldingNet::new(&spn).unwrap();
            let target = net.get_accepting_target();
            let mut heuristic = HeuristicEstimator::new(&net);

            for marking in reachable_markings(&spn) {
                let estimate = heuristic.estimate(&marking.extend_to(net.get_number_of_places()), &target);
                if let Some(cost) = spn.shortest_completion(&marking) {
                    assert!(estimate <= cost, "estimate {} exceeds {} from {}\n{}", estimate, cost, marking, spn);
                }
            }
        }
    }
}
