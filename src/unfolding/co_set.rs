use rustc_hash::FxHashMap;

use crate::unfolding::occurrence_net::{ConditionIndex, OccurrenceNet};

/**
 * Decides whether conditions are pairwise concurrent: neither causally related nor in conflict.
 * The backward walk itself is `OccurrenceNet::is_co_set`; this keeps the answers for pairs and counts queries.
 */
#[derive(Default)]
pub struct CoSetOracle {
    pairs: FxHashMap<(ConditionIndex, ConditionIndex), bool>,
    queries: usize,
    cache_hits: usize,
}

impl CoSetOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /**
     * Pairs are cached: the relation between two existing conditions never changes as the prefix grows.
     */
    pub fn is_co_pair(&mut self, occurrence_net: &mut OccurrenceNet, a: ConditionIndex, b: ConditionIndex) -> bool {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.queries += 1;
        if let Some(result) = self.pairs.get(&key) {
            self.cache_hits += 1;
            return *result;
        }

        let result = occurrence_net.is_co_set(&[key.0, key.1]);
        self.pairs.insert(key, result);
        result
    }

    pub fn is_co_set(&mut self, occurrence_net: &mut OccurrenceNet, conditions: &[ConditionIndex]) -> bool {
        match conditions {
            [] | [_] => true,
            [a, b] => self.is_co_pair(occurrence_net, *a, *b),
            _ => {
                self.queries += 1;
                occurrence_net.is_co_set(conditions)
            }
        }
    }

    pub fn get_number_of_queries(&self) -> usize {
        self.queries
    }

    pub fn get_number_of_cache_hits(&self) -> usize {
        self.cache_hits
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{
        ebi_objects::synchronous_product_net::{MoveType, SynchronousProductNet},
        unfolding::{occurrence_net::OccurrenceNet, unfolding_net::UnfoldingNet},
    };

    use super::CoSetOracle;

    /**
     * p0 -t0-> p1, p2 (fork); p1 -t1-> p3; p1 -t2-> p4 (choice); p2 -t3-> p5
     */
    fn fork_and_choice() -> UnfoldingNet {
        let mut spn = SynchronousProductNet::new();
        for _ in 0..6 {
            spn.add_place();
        }
        let arcs: [(&[usize], &[usize]); 4] = [(&[0], &[1, 2]), (&[1], &[3]), (&[1], &[4]), (&[2], &[5])];
        for (inputs, outputs) in arcs {
            let t = spn.add_transition(None, MoveType::Silent, 1);
            for p in inputs {
                spn.add_place_transition_arc(*p, t).unwrap();
            }
            for p in outputs {
                spn.add_transition_place_arc(t, *p).unwrap();
            }
        }
        spn.set_initial_marking(0, 1).unwrap();
        spn.set_final_marking(5, 1).unwrap();
        UnfoldingNet::new(&spn).unwrap()
    }

    #[test]
    fn causality_conflict_concurrency() {
        let net = fork_and_choice();
        let mut occ = OccurrenceNet::new(net.get_number_of_places());
        let mut oracle = CoSetOracle::new();

        let c0 = occ.add_initial_condition(0);
        let fork = occ.add_event(&net, 0, vec![c0]);
        let post = occ.expand_event(&net, fork);
        let (c1, c2) = (post[0], post[1]);
        let e1 = occ.add_event(&net, 1, vec![c1]);
        let e2 = occ.add_event(&net, 2, vec![c1]);
        let e3 = occ.add_event(&net, 3, vec![c2]);
        let c3 = occ.expand_event(&net, e1)[0];
        let c4 = occ.expand_event(&net, e2)[0];
        let c5 = occ.expand_event(&net, e3)[0];

        //concurrent
        assert!(oracle.is_co_set(&mut occ, &[c1, c2]));
        assert!(oracle.is_co_set(&mut occ, &[c3, c5]));
        assert!(oracle.is_co_set(&mut occ, &[c4, c5]));
        assert!(oracle.is_co_set(&mut occ, &[c3, c2]));

        //causal
        assert!(!oracle.is_co_set(&mut occ, &[c0, c1]));
        assert!(!oracle.is_co_set(&mut occ, &[c3, c1]));
        assert!(!oracle.is_co_set(&mut occ, &[c5, c0]));

        //conflict
        assert!(!oracle.is_co_set(&mut occ, &[c3, c4]));
        assert!(!oracle.is_co_set(&mut occ, &[c3, c4, c5]));

        //trivial
        assert!(oracle.is_co_set(&mut occ, &[c4]));
        assert!(oracle.is_co_set(&mut occ, &[]));
        assert!(!oracle.is_co_set(&mut occ, &[c4, c4]));
        assert!(oracle.is_co_set(&mut occ, &[c3, c5]));
        assert!(oracle.get_number_of_cache_hits() > 0);
    }

    #[test]
    fn symmetry() {
        let fin = fs::read_to_string("testfiles/trace-ab-model-ac.spn").unwrap();
        let net = UnfoldingNet::new(&fin.parse::<SynchronousProductNet>().unwrap()).unwrap();
        let mut occ = OccurrenceNet::new(net.get_number_of_places());
        let c0 = occ.add_initial_condition(0);
        let c3 = occ.add_initial_condition(3);
        let sync = occ.add_event(&net, 4, vec![c0, c3]);
        let log = occ.add_event(&net, 0, vec![c0]);
        let model = occ.add_event(&net, 2, vec![c3]);
        occ.expand_event(&net, sync);
        occ.expand_event(&net, log);
        occ.expand_event(&net, model);

        let number_of_conditions = occ.get_number_of_conditions();
        for a in 0..number_of_conditions {
            for b in 0..number_of_conditions {
                let mut fresh = CoSetOracle::new();
                let ab = fresh.is_co_set(&mut occ, &[a, b]);
                let mut fresh = CoSetOracle::new();
                let ba = fresh.is_co_set(&mut occ, &[b, a]);
                assert_eq!(ab, ba, "conditions {} and {}", a, b);
            }
        }
    }
}
