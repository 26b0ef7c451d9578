use strum_macros::{Display, EnumString};

use crate::{
    ebi_objects::synchronous_product_net::TransitionIndex,
    marking::PlaceIndex,
    unfolding::{
        co_set::CoSetOracle,
        occurrence_net::{ConditionIndex, OccurrenceNet},
        unfolding_net::UnfoldingNet,
    },
};

/// A transition together with the conditions an occurrence of it would consume.
pub type Extension = (TransitionIndex, Vec<ConditionIndex>);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ExtensionStrategy {
    /// Only look at the extensions that involve a newly created condition.
    #[default]
    Incremental,
    /// Combine conditions until they match a preset; exponential in the preset width.
    Naive,
}

/**
 * The extensions of the prefix that consume the new condition and that do not exist yet.
 * For each transition that consumes from the condition's place, the other input places are filled with
 * conditions that are pairwise concurrent with it and with each other.
 */
pub fn extensions_of_condition(
    net: &UnfoldingNet,
    occurrence_net: &mut OccurrenceNet,
    oracle: &mut CoSetOracle,
    condition: ConditionIndex,
) -> Vec<Extension> {
    let mut result = vec![];
    let place = occurrence_net.get_place(condition);

    for transition in net.get_consumers(place) {
        let transition = *transition;
        let other_places = net
            .get_input_places(transition)
            .iter()
            .copied()
            .filter(|p| *p != place)
            .collect::<Vec<PlaceIndex>>();

        match other_places.len() {
            0 => {
                if !occurrence_net.event_exists(transition, &[condition]) {
                    result.push((transition, vec![condition]));
                }
            }
            1 => {
                let candidates = occurrence_net.get_conditions_of_place(other_places[0]).to_vec();
                for other in candidates {
                    if oracle.is_co_pair(occurrence_net, condition, other) {
                        let preset = sorted(vec![condition, other]);
                        if !occurrence_net.event_exists(transition, &preset) {
                            result.push((transition, preset));
                        }
                    }
                }
            }
            _ => {
                for tuple in concurrent_tuples(occurrence_net, oracle, condition, &other_places) {
                    let mut preset = tuple;
                    preset.push(condition);
                    let preset = sorted(preset);
                    if !occurrence_net.event_exists(transition, &preset) {
                        result.push((transition, preset));
                    }
                }
            }
        }
    }

    result
}

/**
 * All choices of one condition per place, such that the chosen conditions and the given condition are
 * pairwise concurrent. The cartesian product is walked depth-first, pruning a partial choice as soon
 * as its latest condition is not concurrent with an earlier one.
 */
fn concurrent_tuples(
    occurrence_net: &mut OccurrenceNet,
    oracle: &mut CoSetOracle,
    condition: ConditionIndex,
    places: &[PlaceIndex],
) -> Vec<Vec<ConditionIndex>> {
    let candidates = places
        .iter()
        .map(|place| occurrence_net.get_conditions_of_place(*place).to_vec())
        .collect::<Vec<_>>();
    if candidates.iter().any(|c| c.is_empty()) {
        return vec![];
    }

    let mut result = vec![];
    let mut stack: Vec<Vec<ConditionIndex>> = vec![vec![]];
    while let Some(partial) = stack.pop() {
        let depth = partial.len();
        if depth == places.len() {
            result.push(partial);
            continue;
        }

        for next in candidates[depth].iter().rev() {
            if !oracle.is_co_pair(occurrence_net, condition, *next) {
                continue;
            }
            if partial.iter().all(|earlier| oracle.is_co_pair(occurrence_net, *earlier, *next)) {
                let mut extended = partial.clone();
                extended.push(*next);
                stack.push(extended);
            }
        }
    }
    result
}

/**
 * The extensions whose preset consists of the seed conditions plus conditions created after the last seed.
 * Candidates are grown in creation order, so every set of conditions is considered at most once per seed.
 * A candidate is abandoned as soon as its places are not part of any preset, or it is not a co-set.
 */
pub fn extensions_naive(
    net: &UnfoldingNet,
    occurrence_net: &mut OccurrenceNet,
    oracle: &mut CoSetOracle,
    seed: Vec<ConditionIndex>,
) -> Vec<Extension> {
    let mut result = vec![];
    let mut stack = vec![seed];

    while let Some(candidate) = stack.pop() {
        let mut places = candidate.iter().map(|c| occurrence_net.get_place(*c)).collect::<Vec<_>>();
        places.sort();

        if !net.is_part_of_some_preset(&places) || !oracle.is_co_set(occurrence_net, &candidate) {
            continue;
        }

        let preset = sorted(candidate.clone());
        for transition in net.get_consumers(places[0]) {
            if net.has_input_places(*transition, &places) && !occurrence_net.event_exists(*transition, &preset) {
                result.push((*transition, preset.clone()));
            }
        }

        let last = candidate[candidate.len() - 1];
        for next in ((last + 1)..occurrence_net.get_number_of_conditions()).rev() {
            let mut extended = candidate.clone();
            extended.push(next);
            stack.push(extended);
        }
    }

    result
}

fn sorted(mut conditions: Vec<ConditionIndex>) -> Vec<ConditionIndex> {
    conditions.sort();
    conditions
}
