use std::fmt::{self, Display};

use bitvec::{bitvec, vec::BitVec};

use crate::{
    ebi_objects::synchronous_product_net::TransitionIndex,
    marking::{PlaceIndex, PlaceSet},
    unfolding::unfolding_net::UnfoldingNet,
};

pub type ConditionIndex = usize;
pub type EventIndex = usize;

/**
 * An occurrence of a place.
 */
#[derive(Clone, Debug)]
pub struct Condition {
    pub(crate) place: PlaceIndex,
    pub(crate) producer: Option<EventIndex>, //none for the conditions of the initial marking
    pub(crate) consumers: Vec<EventIndex>,
    pub(crate) visited: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CutoffKind {
    /// The induced marking was reached before.
    Structural,
    /// The cost already exceeds that of a found alignment.
    Pruned,
}

/**
 * An occurrence of a transition.
 */
#[derive(Clone, Debug)]
pub struct Event {
    pub(crate) transition: TransitionIndex,
    pub(crate) preset: Vec<ConditionIndex>, //sorted
    pub(crate) postset: Vec<ConditionIndex>, //empty until the event is expanded
    pub(crate) cost: u64,
    pub(crate) cumulative_cost: u64,
    pub(crate) heuristic: u64,
    pub(crate) local_configuration: BitVec, //indexed by event
    pub(crate) induced_marking: PlaceSet,
    pub(crate) cutoff: Option<CutoffKind>,
    pub(crate) visited: u64,
}

impl Event {
    pub fn get_transition(&self) -> TransitionIndex {
        self.transition
    }

    pub fn get_preset(&self) -> &[ConditionIndex] {
        &self.preset
    }

    pub fn get_postset(&self) -> &[ConditionIndex] {
        &self.postset
    }

    pub fn get_cost(&self) -> u64 {
        self.cost
    }

    pub fn get_cumulative_cost(&self) -> u64 {
        self.cumulative_cost
    }

    pub fn get_heuristic(&self) -> u64 {
        self.heuristic
    }

    /**
     * The cumulative cost plus the estimated cost to complete, which orders the search.
     */
    pub fn get_priority(&self) -> u64 {
        self.cumulative_cost.saturating_add(self.heuristic)
    }

    pub fn get_cutoff(&self) -> Option<CutoffKind> {
        self.cutoff
    }

    pub fn is_expanded(&self) -> bool {
        !self.postset.is_empty()
    }
}

/**
 * The prefix of the branching process built so far: an acyclic bipartite graph of conditions and events.
 * Nodes are only ever added; indices are never reused.
 */
#[derive(Clone, Debug)]
pub struct OccurrenceNet {
    conditions: Vec<Condition>,
    events: Vec<Event>,
    initial_conditions: Vec<ConditionIndex>,
    place2conditions: Vec<Vec<ConditionIndex>>,
    generation: u64,
}

impl OccurrenceNet {
    pub fn new(number_of_places: usize) -> Self {
        Self {
            conditions: vec![],
            events: vec![],
            initial_conditions: vec![],
            place2conditions: vec![vec![]; number_of_places],
            generation: 0,
        }
    }

    pub fn get_number_of_conditions(&self) -> usize {
        self.conditions.len()
    }

    pub fn get_number_of_events(&self) -> usize {
        self.events.len()
    }

    pub fn get_event(&self, event: EventIndex) -> &Event {
        &self.events[event]
    }

    pub fn get_place(&self, condition: ConditionIndex) -> PlaceIndex {
        self.conditions[condition].place
    }

    pub fn get_producer(&self, condition: ConditionIndex) -> Option<EventIndex> {
        self.conditions[condition].producer
    }

    pub fn get_initial_conditions(&self) -> &[ConditionIndex] {
        &self.initial_conditions
    }

    /**
     * All conditions ever created for the place, in creation order.
     */
    pub fn get_conditions_of_place(&self, place: PlaceIndex) -> &[ConditionIndex] {
        &self.place2conditions[place]
    }

    pub fn add_initial_condition(&mut self, place: PlaceIndex) -> ConditionIndex {
        debug_assert!(self.events.is_empty(), "initial conditions must precede all events");
        let condition = self.add_condition(place, None);
        self.initial_conditions.push(condition);
        condition
    }

    fn add_condition(&mut self, place: PlaceIndex, producer: Option<EventIndex>) -> ConditionIndex {
        let condition = self.conditions.len();
        self.conditions.push(Condition {
            place,
            producer,
            consumers: vec![],
            visited: 0,
        });
        self.place2conditions[place].push(condition);
        condition
    }

    /**
     * Adds an occurrence of the transition that consumes the given conditions. The preset must be a co-set
     * that maps exactly onto the input places of the transition; this is the caller's responsibility and
     * is asserted in debug builds.
     * The postset is not created here, but when the event is expanded.
     */
    pub fn add_event(
        &mut self,
        net: &UnfoldingNet,
        transition: TransitionIndex,
        mut preset: Vec<ConditionIndex>,
    ) -> EventIndex {
        preset.sort();
        assert!(!preset.is_empty(), "an event needs a non-empty preset");
        debug_assert!({
            let mut places = preset.iter().map(|c| self.conditions[*c].place).collect::<Vec<_>>();
            places.sort();
            net.has_input_places(transition, &places)
        });
        debug_assert!(self.is_co_set(&preset), "the preset {:?} of transition {} is not a co-set", preset, transition);

        let event = self.events.len();

        //local configuration: the event itself and the local configurations of the producers of its preset
        let mut local_configuration = bitvec![0; event + 1];
        local_configuration.set(event, true);
        for condition in &preset {
            if let Some(producer) = self.conditions[*condition].producer {
                for predecessor in self.events[producer].local_configuration.iter_ones() {
                    local_configuration.set(predecessor, true);
                }
            }
        }

        let cost = net.get_cost(transition);
        let cumulative_cost = local_configuration
            .iter_ones()
            .filter(|e| *e != event)
            .map(|e| self.events[e].cost)
            .sum::<u64>()
            + cost;

        let induced_marking = self.compute_induced_marking(net, &local_configuration, event, transition, &preset);

        for condition in &preset {
            self.conditions[*condition].consumers.push(event);
        }

        self.events.push(Event {
            transition,
            preset,
            postset: vec![],
            cost,
            cumulative_cost,
            heuristic: 0,
            local_configuration,
            induced_marking,
            cutoff: None,
            visited: 0,
        });

        event
    }

    /**
     * Mark([e]) = places((initial conditions + postset([e])) - preset([e])).
     * The postset of the new event itself is not there yet, so its output places are added directly.
     */
    fn compute_induced_marking(
        &self,
        net: &UnfoldingNet,
        local_configuration: &BitVec,
        event: EventIndex,
        transition: TransitionIndex,
        preset: &[ConditionIndex],
    ) -> PlaceSet {
        let mut cut = bitvec![0; self.conditions.len()];
        for condition in &self.initial_conditions {
            cut.set(*condition, true);
        }
        for e in local_configuration.iter_ones().filter(|e| *e != event) {
            for condition in &self.events[e].postset {
                cut.set(*condition, true);
            }
        }
        for e in local_configuration.iter_ones().filter(|e| *e != event) {
            for condition in &self.events[e].preset {
                cut.set(*condition, false);
            }
        }
        for condition in preset {
            cut.set(*condition, false);
        }

        let mut marking = PlaceSet::from_places(
            net.get_number_of_places(),
            cut.iter_ones().map(|condition| self.conditions[condition].place),
        );
        for place in net.get_output_places(transition) {
            marking.insert(*place);
        }
        marking
    }

    /**
     * Creates one condition for each output place of the event's transition.
     */
    pub fn expand_event(&mut self, net: &UnfoldingNet, event: EventIndex) -> Vec<ConditionIndex> {
        assert!(!self.events[event].is_expanded(), "event {} was already expanded", event);
        let transition = self.events[event].transition;
        let postset = net
            .get_output_places(transition)
            .iter()
            .map(|place| self.add_condition(*place, Some(event)))
            .collect::<Vec<_>>();
        self.events[event].postset = postset.clone();
        postset
    }

    pub fn set_heuristic(&mut self, event: EventIndex, heuristic: u64) {
        self.events[event].heuristic = heuristic;
    }

    pub fn set_cutoff(&mut self, event: EventIndex, kind: CutoffKind) {
        self.events[event].cutoff = Some(kind);
    }

    /**
     * The local configuration of the event: itself and every event that must have occurred before it.
     */
    pub fn local_configuration(&self, event: EventIndex) -> impl Iterator<Item = EventIndex> + '_ {
        self.events[event].local_configuration.iter_ones()
    }

    pub fn induced_marking(&self, event: EventIndex) -> &PlaceSet {
        &self.events[event].induced_marking
    }

    /**
     * Returns whether some event in the local configuration of the event is a cutoff of either kind.
     */
    pub fn has_cutoff_in_local_configuration(&self, event: EventIndex) -> bool {
        self.local_configuration(event).any(|e| self.events[e].cutoff.is_some())
    }

    /**
     * Returns whether an occurrence of the transition that consumes exactly the given conditions exists already.
     */
    pub fn event_exists(&self, transition: TransitionIndex, preset: &[ConditionIndex]) -> bool {
        match preset.first() {
            None => false,
            Some(first) => self.conditions[*first].consumers.iter().any(|event| {
                self.events[*event].transition == transition
                    && preset[1..].iter().all(|condition| self.conditions[*condition].consumers.contains(event))
            }),
        }
    }

    /**
     * Returns whether the conditions are pairwise concurrent, by walking backwards from them through their
     * producers and stamping every condition and event met with a fresh generation. Conditions that are
     * ancestors of one another, or whose histories consume a shared condition through different events,
     * make the walk meet a condition twice.
     */
    pub(crate) fn is_co_set(&mut self, conditions: &[ConditionIndex]) -> bool {
        if conditions.len() < 2 {
            return true;
        }

        self.generation += 1;
        let generation = self.generation;
        let mut stack = vec![];

        for condition in conditions {
            if self.conditions[*condition].visited == generation {
                //the same condition twice
                return false;
            }
            self.conditions[*condition].visited = generation;
            if let Some(producer) = self.conditions[*condition].producer {
                if self.events[producer].visited != generation {
                    self.events[producer].visited = generation;
                    stack.push(producer);
                }
            }
        }

        while let Some(event) = stack.pop() {
            for position in 0..self.events[event].preset.len() {
                let condition = self.events[event].preset[position];
                if self.conditions[condition].visited == generation {
                    return false;
                }
                self.conditions[condition].visited = generation;

                if let Some(producer) = self.conditions[condition].producer {
                    if self.events[producer].visited != generation {
                        self.events[producer].visited = generation;
                        stack.push(producer);
                    }
                }
            }
        }

        true
    }
}

impl Display for OccurrenceNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "occurrence net with {} conditions and {} events", self.conditions.len(), self.events.len())?;
        for (event, e) in self.events.iter().enumerate() {
            writeln!(f, "e{}: t{} {:?} -> {:?}, cost {}", event, e.transition, e.preset, e.postset, e.cumulative_cost)?;
        }
        write!(f, "")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{
        ebi_objects::synchronous_product_net::{MoveType, SynchronousProductNet},
        marking::PlaceSet,
        unfolding::unfolding_net::UnfoldingNet,
    };

    use super::OccurrenceNet;

    fn net(file: &str) -> UnfoldingNet {
        let fin = fs::read_to_string(file).unwrap();
        UnfoldingNet::new(&fin.parse::<SynchronousProductNet>().unwrap()).unwrap()
    }

    #[test]
    fn local_configuration_and_marking() {
        let net = net("testfiles/trace-ab-model-ac.spn");
        let mut occ = OccurrenceNet::new(net.get_number_of_places());
        let c0 = occ.add_initial_condition(0);
        let c3 = occ.add_initial_condition(3);
        assert_eq!(occ.get_initial_conditions(), &[c0, c3]);

        //synchronous a
        let e0 = occ.add_event(&net, 4, vec![c3, c0]);
        assert_eq!(occ.get_event(e0).get_preset(), &[c0, c3]);
        assert_eq!(occ.induced_marking(e0), &PlaceSet::from_places(7, [1, 4]));
        assert_eq!(occ.get_event(e0).get_cumulative_cost(), 0);

        let postset = occ.expand_event(&net, e0);
        assert_eq!(postset.len(), 2);
        let c1 = postset[0];
        let c4 = postset[1];
        assert_eq!(occ.get_event(e0).get_postset(), &[c1, c4]);
        assert_eq!(occ.get_place(c1), 1);
        assert_eq!(occ.get_producer(c4), Some(e0));

        //log b, then model c
        let e1 = occ.add_event(&net, 1, vec![c1]);
        let e2 = occ.add_event(&net, 3, vec![c4]);
        assert_eq!(occ.local_configuration(e1).collect::<Vec<_>>(), vec![e0, e1]);
        assert_eq!(occ.induced_marking(e1), &PlaceSet::from_places(7, [2, 4]));
        assert_eq!(occ.induced_marking(e2), &PlaceSet::from_places(7, [1, 5]));
        assert_eq!(occ.get_event(e2).get_cumulative_cost(), 1);

        let c2 = occ.expand_event(&net, e1)[0];
        let c5 = occ.expand_event(&net, e2)[0];
        let accepting = occ.add_event(&net, net.get_accepting_transition(), vec![c2, c5]);
        assert_eq!(occ.local_configuration(accepting).collect::<Vec<_>>(), vec![e0, e1, e2, accepting]);
        assert_eq!(occ.get_event(accepting).get_cumulative_cost(), 2);
        assert_eq!(occ.induced_marking(accepting), &PlaceSet::from_places(7, [6]));
    }

    #[test]
    fn monotonic_prefix() {
        let net = net("testfiles/loop.spn");
        let mut occ = OccurrenceNet::new(net.get_number_of_places());
        let c0 = occ.add_initial_condition(0);
        let e0 = occ.add_event(&net, 0, vec![c0]);
        let c1 = occ.expand_event(&net, e0)[0];

        let mut previous = (occ.get_number_of_conditions(), occ.get_number_of_events());
        let mut condition = c1;
        for _ in 0..5 {
            let event = occ.add_event(&net, 1, vec![condition]);
            let next = occ.expand_event(&net, event)[0];
            assert!(next > condition);
            assert!(occ.get_number_of_conditions() > previous.0);
            assert!(occ.get_number_of_events() > previous.1);
            previous = (occ.get_number_of_conditions(), occ.get_number_of_events());
            condition = next;
        }

        assert!(occ.event_exists(1, &[c1]));
        assert!(!occ.event_exists(2, &[c1]));
        assert_eq!(occ.get_conditions_of_place(1).len(), 6);
    }

    /**
     * p0 -t0-> p1; p0 -t1-> p2 (choice); p1, p2 -t2-> p3
     */
    fn choice_then_join() -> UnfoldingNet {
        let mut spn = SynchronousProductNet::new();
        for _ in 0..4 {
            spn.add_place();
        }
        let arcs: [(&[usize], &[usize]); 3] = [(&[0], &[1]), (&[0], &[2]), (&[1, 2], &[3])];
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
        spn.set_final_marking(3, 1).unwrap();
        UnfoldingNet::new(&spn).unwrap()
    }

    #[test]
    fn co_set_of_choice() {
        let net = choice_then_join();
        let mut occ = OccurrenceNet::new(net.get_number_of_places());
        let c0 = occ.add_initial_condition(0);
        let left = occ.add_event(&net, 0, vec![c0]);
        let right = occ.add_event(&net, 1, vec![c0]);
        let c1 = occ.expand_event(&net, left)[0];
        let c2 = occ.expand_event(&net, right)[0];

        assert!(!occ.is_co_set(&[c1, c2]));
        assert!(!occ.is_co_set(&[c0, c1]));
        assert!(occ.is_co_set(&[c2]));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "is not a co-set")]
    fn event_from_conflicting_conditions() {
        let net = choice_then_join();
        let mut occ = OccurrenceNet::new(net.get_number_of_places());
        let c0 = occ.add_initial_condition(0);
        let left = occ.add_event(&net, 0, vec![c0]);
        let right = occ.add_event(&net, 1, vec![c0]);
        let c1 = occ.expand_event(&net, left)[0];
        let c2 = occ.expand_event(&net, right)[0];

        //c1 and c2 come from the two branches of a choice
        occ.add_event(&net, 2, vec![c1, c2]);
    }
}
