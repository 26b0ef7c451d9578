use rustc_hash::FxHashMap;

use crate::{
    marking::PlaceSet,
    unfolding::{
        occurrence_net::{CutoffKind, EventIndex, OccurrenceNet},
        unfolding_net::UnfoldingNet,
    },
};

/**
 * Bounds the unfolding: an event whose induced marking was reached before by another event is a cutoff,
 * as everything that can happen after it can also happen after the earlier event.
 */
#[derive(Default)]
pub struct CutoffDetector {
    seen: FxHashMap<PlaceSet, EventIndex>,
    number_of_cutoffs: usize,
}

impl CutoffDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /**
     * To be called once per event, after it is expanded. Marks the event as a structural cutoff if applicable.
     */
    pub fn is_cutoff(&mut self, net: &UnfoldingNet, occurrence_net: &mut OccurrenceNet, event: EventIndex) -> bool {
        if net.is_accepting_transition(occurrence_net.get_event(event).get_transition()) {
            return false;
        }

        let marking = occurrence_net.induced_marking(event);
        match self.seen.get(marking) {
            Some(earlier) if *earlier != event => {
                log::trace!("event {} is a cutoff: marking {} was reached by event {}", event, marking, earlier);
                occurrence_net.set_cutoff(event, CutoffKind::Structural);
                self.number_of_cutoffs += 1;
                true
            }
            Some(_) => false,
            None => {
                self.seen.insert(marking.clone(), event);
                false
            }
        }
    }

    /**
     * The event that first reached the marking.
     */
    pub fn get_companion(&self, marking: &PlaceSet) -> Option<EventIndex> {
        self.seen.get(marking).copied()
    }

    pub fn get_number_of_cutoffs(&self) -> usize {
        self.number_of_cutoffs
    }

    pub fn get_number_of_markings(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{
        ebi_objects::synchronous_product_net::SynchronousProductNet,
        unfolding::{
            occurrence_net::{CutoffKind, OccurrenceNet},
            unfolding_net::UnfoldingNet,
        },
    };

    use super::CutoffDetector;

    #[test]
    fn loop_cutoff() {
        let fin = fs::read_to_string("testfiles/loop.spn").unwrap();
        let net = UnfoldingNet::new(&fin.parse::<SynchronousProductNet>().unwrap()).unwrap();
        let mut occ = OccurrenceNet::new(net.get_number_of_places());
        let mut cutoffs = CutoffDetector::new();

        let c0 = occ.add_initial_condition(0);
        let enter = occ.add_event(&net, 0, vec![c0]);
        assert!(!cutoffs.is_cutoff(&net, &mut occ, enter));
        let c1 = occ.expand_event(&net, enter)[0];

        //going around the loop once reaches the same marking {p1}
        let around = occ.add_event(&net, 1, vec![c1]);
        assert!(cutoffs.is_cutoff(&net, &mut occ, around));
        assert_eq!(occ.get_event(around).get_cutoff(), Some(CutoffKind::Structural));
        assert_eq!(cutoffs.get_companion(occ.induced_marking(around)), Some(enter));

        let exit = occ.add_event(&net, 2, vec![c1]);
        assert!(!cutoffs.is_cutoff(&net, &mut occ, exit));
        let c2 = occ.expand_event(&net, exit)[0];
        let accepting = occ.add_event(&net, net.get_accepting_transition(), vec![c2]);
        assert!(!cutoffs.is_cutoff(&net, &mut occ, accepting));

        assert_eq!(cutoffs.get_number_of_cutoffs(), 1);
        assert_eq!(cutoffs.get_number_of_markings(), 2);
        assert!(occ.has_cutoff_in_local_configuration(around));
        assert!(!occ.has_cutoff_in_local_configuration(accepting));
    }

    #[test]
    fn cutoff_soundness() {
        let fin = fs::read_to_string("testfiles/loop.spn").unwrap();
        let net = UnfoldingNet::new(&fin.parse::<SynchronousProductNet>().unwrap()).unwrap();
        let mut occ = OccurrenceNet::new(net.get_number_of_places());
        let mut cutoffs = CutoffDetector::new();

        //unfold the loop three times without stopping at cutoffs, leaving it after each round
        let c0 = occ.add_initial_condition(0);
        let enter = occ.add_event(&net, 0, vec![c0]);
        cutoffs.is_cutoff(&net, &mut occ, enter);
        let mut condition = occ.expand_event(&net, enter)[0];
        for _ in 0..3 {
            let exit = occ.add_event(&net, 2, vec![condition]);
            cutoffs.is_cutoff(&net, &mut occ, exit);
            let around = occ.add_event(&net, 1, vec![condition]);
            cutoffs.is_cutoff(&net, &mut occ, around);
            condition = occ.expand_event(&net, around)[0];
        }

        assert_eq!(cutoffs.get_number_of_cutoffs(), 5);
        for event in 0..occ.get_number_of_events() {
            if occ.get_event(event).get_cutoff().is_some() {
                let companion = cutoffs.get_companion(occ.induced_marking(event)).unwrap();
                assert!(companion < event);
                assert_eq!(occ.induced_marking(companion), occ.induced_marking(event));
            }
        }
    }
}
