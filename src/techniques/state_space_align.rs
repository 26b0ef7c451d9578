use anyhow::{Context, Result, anyhow};

use crate::{
    ebi_objects::synchronous_product_net::{SynchronousProductNet, TransitionIndex},
    marking::PlaceSet,
};

/**
 * Alignment by a shortest-path search over the reachable markings of the net itself, without unfolding.
 * Markings are sets of places, so the net is explored as if it were 1-safe.
 */
pub trait StateSpaceAlign {
    /**
     * Returns the cheapest sequence of transitions that marks the final places, with its cost,
     * or None if the final places cannot be marked.
     */
    fn align_state_space(&self) -> Result<Option<(Vec<TransitionIndex>, u64)>>;

    /**
     * The cost of the cheapest way to mark the final places, starting from the given marking.
     */
    fn shortest_completion(&self, from: &PlaceSet) -> Option<u64>;
}

impl StateSpaceAlign for SynchronousProductNet {
    fn align_state_space(&self) -> Result<Option<(Vec<TransitionIndex>, u64)>> {
        self.validate().context("validating the synchronous product net")?;
        let start = self.get_initial_marking().to_place_set(self.get_number_of_places());
        log::info!("start state-space search from {}", start);

        match dijkstra_from(self, &start) {
            Some((markings, cost)) => {
                log::info!("state-space search reached the final marking with cost {}", cost);
                Ok(Some((transform_path(self, markings)?, cost)))
            }
            None => {
                log::info!("state-space search exhausted all reachable markings");
                Ok(None)
            }
        }
    }

    fn shortest_completion(&self, from: &PlaceSet) -> Option<u64> {
        dijkstra_from(self, from).map(|(_, cost)| cost)
    }
}

fn dijkstra_from(net: &SynchronousProductNet, start: &PlaceSet) -> Option<(Vec<PlaceSet>, u64)> {
    let target = net.get_final_marking().to_place_set(net.get_number_of_places());

    let successors = |marking: &PlaceSet| {
        enabled_transitions(net, marking)
            .map(|transition| (fire(net, marking, transition), net.get_transition_cost(transition)))
            .collect::<Vec<_>>()
    };

    let success = |marking: &PlaceSet| target.is_subset_of(marking);

    pathfinding::prelude::dijkstra(start, successors, success)
}

/**
 * The search returns a sequence of markings, while we need a sequence of transitions.
 * Between two consecutive markings, the cheapest transition that connects them is taken.
 */
fn transform_path(net: &SynchronousProductNet, markings: Vec<PlaceSet>) -> Result<Vec<TransitionIndex>> {
    let mut result = vec![];
    for window in markings.windows(2) {
        let (from, to) = (&window[0], &window[1]);
        let transition = enabled_transitions(net, from)
            .filter(|transition| &fire(net, from, *transition) == to)
            .min_by_key(|transition| net.get_transition_cost(*transition))
            .ok_or_else(|| anyhow!("there is no transition that brings the net from {} to {}", from, to))?;
        result.push(transition);
    }
    Ok(result)
}

pub(crate) fn enabled_transitions<'a>(
    net: &'a SynchronousProductNet,
    marking: &'a PlaceSet,
) -> impl Iterator<Item = TransitionIndex> + 'a {
    (0..net.get_number_of_transitions())
        .filter(move |transition| net.get_input_places(*transition).iter().all(|place| marking.contains(*place)))
}

pub(crate) fn fire(net: &SynchronousProductNet, marking: &PlaceSet, transition: TransitionIndex) -> PlaceSet {
    let mut result = marking.clone();
    for place in net.get_input_places(transition) {
        result.remove(*place);
    }
    for place in net.get_output_places(transition) {
        result.insert(*place);
    }
    result
}
