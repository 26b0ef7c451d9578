use anyhow::{Context, Result};

use crate::{
    ebi_objects::synchronous_product_net::{SynchronousProductNet, TransitionIndex},
    marking::{PlaceIndex, PlaceSet},
};

/**
 * The net that is unfolded: a validated synchronous product net, extended with an accepting transition
 * that consumes the final marking and produces a token in a fresh accepting place.
 * The accepting transition costs nothing.
 */
#[derive(Clone, Debug)]
pub struct UnfoldingNet {
    number_of_places: usize,
    initial_places: Vec<PlaceIndex>,
    costs: Vec<u64>,
    transition2input_places: Vec<Vec<PlaceIndex>>, //sorted
    transition2output_places: Vec<Vec<PlaceIndex>>,
    place2input_transitions: Vec<Vec<TransitionIndex>>,
    place2output_transitions: Vec<Vec<TransitionIndex>>,
    accepting_transition: TransitionIndex,
    accepting_place: PlaceIndex,
}

impl UnfoldingNet {
    pub fn new(net: &SynchronousProductNet) -> Result<Self> {
        net.validate().context("validating the synchronous product net")?;

        let accepting_place = net.get_number_of_places();
        let accepting_transition = net.get_number_of_transitions();
        let number_of_places = accepting_place + 1;

        let mut transition2input_places = vec![];
        let mut transition2output_places = vec![];
        let mut costs = vec![];
        for transition in 0..net.get_number_of_transitions() {
            let mut inputs = net.get_input_places(transition).to_vec();
            inputs.sort();
            transition2input_places.push(inputs);
            transition2output_places.push(net.get_output_places(transition).to_vec());
            costs.push(net.get_transition_cost(transition));
        }

        transition2input_places.push(net.get_final_marking().marked_places().collect());
        transition2output_places.push(vec![accepting_place]);
        costs.push(0);

        let mut place2input_transitions = vec![vec![]; number_of_places];
        let mut place2output_transitions = vec![vec![]; number_of_places];
        for (transition, inputs) in transition2input_places.iter().enumerate() {
            for place in inputs {
                place2output_transitions[*place].push(transition);
            }
        }
        for (transition, outputs) in transition2output_places.iter().enumerate() {
            for place in outputs {
                place2input_transitions[*place].push(transition);
            }
        }

        Ok(Self {
            number_of_places,
            initial_places: net.get_initial_marking().marked_places().collect(),
            costs,
            transition2input_places,
            transition2output_places,
            place2input_transitions,
            place2output_transitions,
            accepting_transition,
            accepting_place,
        })
    }

    pub fn get_number_of_places(&self) -> usize {
        self.number_of_places
    }

    pub fn get_number_of_transitions(&self) -> usize {
        self.transition2input_places.len()
    }

    pub fn get_initial_places(&self) -> &[PlaceIndex] {
        &self.initial_places
    }

    pub fn get_cost(&self, transition: TransitionIndex) -> u64 {
        self.costs[transition]
    }

    pub fn get_input_places(&self, transition: TransitionIndex) -> &[PlaceIndex] {
        &self.transition2input_places[transition]
    }

    pub fn get_output_places(&self, transition: TransitionIndex) -> &[PlaceIndex] {
        &self.transition2output_places[transition]
    }

    /**
     * The transitions that produce a token in the place.
     */
    pub fn get_producers(&self, place: PlaceIndex) -> &[TransitionIndex] {
        &self.place2input_transitions[place]
    }

    /**
     * The transitions that consume a token from the place.
     */
    pub fn get_consumers(&self, place: PlaceIndex) -> &[TransitionIndex] {
        &self.place2output_transitions[place]
    }

    pub fn get_accepting_transition(&self) -> TransitionIndex {
        self.accepting_transition
    }

    pub fn is_accepting_transition(&self, transition: TransitionIndex) -> bool {
        transition == self.accepting_transition
    }

    pub fn get_accepting_place(&self) -> PlaceIndex {
        self.accepting_place
    }

    pub fn get_accepting_target(&self) -> PlaceSet {
        PlaceSet::from_places(self.number_of_places, [self.accepting_place])
    }

    pub fn get_input_place_set(&self, transition: TransitionIndex) -> PlaceSet {
        PlaceSet::from_places(self.number_of_places, self.transition2input_places[transition].iter().copied())
    }

    /**
     * Returns whether the (sorted) places are exactly the input places of the transition.
     */
    pub fn has_input_places(&self, transition: TransitionIndex, sorted_places: &[PlaceIndex]) -> bool {
        self.transition2input_places[transition] == sorted_places
    }

    /**
     * Returns whether some transition consumes from all of the given places, and possibly more.
     */
    pub fn is_part_of_some_preset(&self, places: &[PlaceIndex]) -> bool {
        match places.first() {
            None => true,
            Some(first) => self.place2output_transitions[*first].iter().any(|transition| {
                places.iter().all(|place| self.transition2input_places[*transition].contains(place))
            }),
        }
    }
}
