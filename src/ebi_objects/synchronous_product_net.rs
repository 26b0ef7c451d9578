use std::{
    fmt,
    io::{self, BufRead},
    str::FromStr,
};

use anyhow::{Context, Error, Result, anyhow};
use strum_macros::{Display, EnumString};

use crate::{
    ebi_framework::{exportable::Exportable, importable::Importable, infoable::Infoable},
    line_reader::LineReader,
    marking::{Marking, PlaceIndex},
};

pub const HEADER: &str = "synchronous product net";

pub type TransitionIndex = usize;

/**
 * What a transition of the synchronous product stands for. The unfolding does not interpret this;
 * it is carried through to the moves of the resulting alignment.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MoveType {
    Synchronous,
    Log,
    Model,
    Silent,
}

#[derive(Clone, Debug)]
pub struct SynchronousProductNet {
    pub(crate) initial_marking: Marking,
    pub(crate) final_marking: Marking,
    pub(crate) labels: Vec<Option<String>>,
    pub(crate) move_types: Vec<MoveType>,
    pub(crate) costs: Vec<u64>,
    pub(crate) place2output_transitions: Vec<Vec<TransitionIndex>>,
    pub(crate) transition2input_places: Vec<Vec<PlaceIndex>>,
    pub(crate) transition2output_places: Vec<Vec<PlaceIndex>>,
}

impl SynchronousProductNet {
    pub fn new() -> Self {
        Self {
            initial_marking: Marking::new(0),
            final_marking: Marking::new(0),
            labels: vec![],
            move_types: vec![],
            costs: vec![],
            place2output_transitions: vec![],
            transition2input_places: vec![],
            transition2output_places: vec![],
        }
    }

    pub fn get_number_of_transitions(&self) -> usize {
        self.transition2input_places.len()
    }

    pub fn get_number_of_places(&self) -> usize {
        self.place2output_transitions.len()
    }

    pub fn get_initial_marking(&self) -> &Marking {
        &self.initial_marking
    }

    pub fn get_final_marking(&self) -> &Marking {
        &self.final_marking
    }

    pub fn get_transition_label(&self, transition: TransitionIndex) -> Option<&str> {
        self.labels[transition].as_deref()
    }

    pub fn get_transition_move_type(&self, transition: TransitionIndex) -> MoveType {
        self.move_types[transition]
    }

    pub fn get_transition_cost(&self, transition: TransitionIndex) -> u64 {
        self.costs[transition]
    }

    pub fn get_input_places(&self, transition: TransitionIndex) -> &[PlaceIndex] {
        &self.transition2input_places[transition]
    }

    pub fn get_output_places(&self, transition: TransitionIndex) -> &[PlaceIndex] {
        &self.transition2output_places[transition]
    }

    pub fn add_place(&mut self) -> PlaceIndex {
        let place = self.get_number_of_places();
        self.place2output_transitions.push(vec![]);
        self.initial_marking.add_place();
        self.final_marking.add_place();
        place
    }

    pub fn add_transition(&mut self, label: Option<String>, move_type: MoveType, cost: u64) -> TransitionIndex {
        self.labels.push(label);
        self.move_types.push(move_type);
        self.costs.push(cost);
        self.transition2input_places.push(vec![]);
        self.transition2output_places.push(vec![]);
        self.get_number_of_transitions() - 1
    }

    pub fn add_place_transition_arc(&mut self, from_place: PlaceIndex, to_transition: TransitionIndex) -> Result<()> {
        self.check_nodes(from_place, to_transition)?;
        if self.transition2input_places[to_transition].contains(&from_place) {
            return Err(anyhow!("place {} is already an input place of transition {}; weighted arcs are not supported", from_place, to_transition));
        }

        self.place2output_transitions[from_place].push(to_transition);
        self.transition2input_places[to_transition].push(from_place);
        Ok(())
    }

    pub fn add_transition_place_arc(&mut self, from_transition: TransitionIndex, to_place: PlaceIndex) -> Result<()> {
        self.check_nodes(to_place, from_transition)?;
        if self.transition2output_places[from_transition].contains(&to_place) {
            return Err(anyhow!("place {} is already an output place of transition {}; weighted arcs are not supported", to_place, from_transition));
        }

        self.transition2output_places[from_transition].push(to_place);
        Ok(())
    }

    pub fn set_initial_marking(&mut self, place: PlaceIndex, tokens: u64) -> Result<()> {
        self.check_place(place)?;
        self.initial_marking.place2token[place] = tokens;
        Ok(())
    }

    pub fn set_final_marking(&mut self, place: PlaceIndex, tokens: u64) -> Result<()> {
        self.check_place(place)?;
        self.final_marking.place2token[place] = tokens;
        Ok(())
    }

    fn check_place(&self, place: PlaceIndex) -> Result<()> {
        if place >= self.get_number_of_places() {
            return Err(anyhow!("non-existing place {} referenced, while there are {}", place, self.get_number_of_places()));
        }
        Ok(())
    }

    fn check_nodes(&self, place: PlaceIndex, transition: TransitionIndex) -> Result<()> {
        if transition >= self.get_number_of_transitions() {
            return Err(anyhow!("non-existing transition {} referenced, while there are {}", transition, self.get_number_of_transitions()));
        }
        self.check_place(place)
    }

    /**
     * Checks that the net can be unfolded: both markings are 1-safe and refer to existing places,
     * the final marking is not empty, and every transition consumes from at least one place.
     */
    pub fn validate(&self) -> Result<()> {
        let number_of_places = self.get_number_of_places();

        if self.initial_marking.get_number_of_places() != number_of_places {
            return Err(anyhow!("the initial marking covers {} places, while the net has {}", self.initial_marking.get_number_of_places(), number_of_places));
        }
        if let Some(place) = self.initial_marking.get_unsafe_place() {
            return Err(anyhow!("the initial marking puts {} tokens in place {}, while at most one token per place is supported", self.initial_marking.place2token[place], place));
        }

        if self.final_marking.get_number_of_places() != number_of_places {
            return Err(anyhow!("the final marking references places that do not exist: it covers {} places, while the net has {}", self.final_marking.get_number_of_places(), number_of_places));
        }
        if let Some(place) = self.final_marking.get_unsafe_place() {
            return Err(anyhow!("the final marking puts {} tokens in place {}, while at most one token per place is supported", self.final_marking.place2token[place], place));
        }
        if self.final_marking.is_empty() {
            return Err(anyhow!("the final marking is empty"));
        }

        for transition in 0..self.get_number_of_transitions() {
            if self.transition2input_places[transition].is_empty() {
                return Err(anyhow!("transition {} has no input places", transition));
            }
        }

        Ok(())
    }
}

impl Importable for SynchronousProductNet {
    fn import(reader: &mut dyn BufRead) -> Result<Self> {
        let mut lreader = LineReader::new(reader);

        let head = lreader.next_line_string().with_context(|| format!("failed to read header, which should be {}", HEADER))?;
        if head.trim() != HEADER {
            return Err(anyhow!("first line should be exactly `{}`, but found `{}` on line `{}`", HEADER, lreader.get_last_line(), lreader.get_last_line_number()));
        }

        let mut result = Self::new();

        let number_of_places = lreader.next_line_index().context("failed to read number of places")?;
        for _ in 0..number_of_places {
            result.add_place();
        }

        for place in 0..number_of_places {
            let tokens = lreader.next_line_natural().with_context(|| format!("failed to read initial marking of place {}", place))?;
            result.set_initial_marking(place, tokens)?;
        }

        for place in 0..number_of_places {
            let tokens = lreader.next_line_natural().with_context(|| format!("failed to read final marking of place {}", place))?;
            result.set_final_marking(place, tokens)?;
        }

        let number_of_transitions = lreader.next_line_index().context("failed to read number of transitions")?;
        for transition in 0..number_of_transitions {
            let label_line = lreader.next_line_string().with_context(|| format!("failed to read label of transition {}", transition))?;
            let label = if label_line.trim_start().starts_with("label ") {
                Some(label_line.trim_start()[6..].to_string())
            } else if label_line.trim() == "silent" {
                None
            } else {
                return Err(anyhow!("expected `label ...` or `silent` for transition {} at line {}; found `{}`", transition, lreader.get_last_line_number(), lreader.get_last_line()));
            };

            let move_type_line = lreader.next_line_string().with_context(|| format!("failed to read move type of transition {}", transition))?;
            let move_type = move_type_line.trim().parse::<MoveType>().with_context(|| format!("failed to read move type of transition {} at line {}; found `{}`", transition, lreader.get_last_line_number(), lreader.get_last_line()))?;

            let cost = lreader.next_line_natural().with_context(|| format!("failed to read cost of transition {}", transition))?;

            result.add_transition(label, move_type, cost);

            let number_of_input_places = lreader.next_line_index().with_context(|| format!("failed to read number of input places of transition {}", transition))?;
            for p in 0..number_of_input_places {
                let place = lreader.next_line_index().with_context(|| format!("failed to read input place number {} of transition {}", p, transition))?;
                result.add_place_transition_arc(place, transition).with_context(|| format!("input place number {} of transition {}, at line {}", p, transition, lreader.get_last_line_number()))?;
            }

            let number_of_output_places = lreader.next_line_index().with_context(|| format!("failed to read number of output places of transition {}", transition))?;
            for p in 0..number_of_output_places {
                let place = lreader.next_line_index().with_context(|| format!("failed to read output place number {} of transition {}", p, transition))?;
                result.add_transition_place_arc(transition, place).with_context(|| format!("output place number {} of transition {}, at line {}", p, transition, lreader.get_last_line_number()))?;
            }
        }

        Ok(result)
    }
}

impl FromStr for SynchronousProductNet {
    type Err = Error;

    fn from_str(s: &str) -> std::prelude::v1::Result<Self, Self::Err> {
        let mut reader = io::Cursor::new(s);
        Self::import(&mut reader)
    }
}

impl Exportable for SynchronousProductNet {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        Ok(write!(f, "{}", self)?)
    }
}

impl Infoable for SynchronousProductNet {
    fn info(&self, f: &mut impl std::io::Write) -> Result<()> {
        writeln!(f, "Number of places\t\t{}", self.get_number_of_places())?;
        writeln!(f, "Number of transitions\t\t{}", self.get_number_of_transitions())?;
        for move_type in [MoveType::Synchronous, MoveType::Log, MoveType::Model, MoveType::Silent] {
            let count = self.move_types.iter().filter(|t| **t == move_type).count();
            writeln!(f, "Number of {} moves\t{}", move_type, count)?;
        }
        writeln!(f, "Initial marking\t\t\t{}", self.initial_marking)?;
        writeln!(f, "Final marking\t\t\t{}", self.final_marking)?;

        Ok(write!(f, "")?)
    }
}

impl fmt::Display for SynchronousProductNet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        writeln!(f, "# number of places\n{}", self.get_number_of_places())?;

        writeln!(f, "# initial marking")?;
        for tokens in self.initial_marking.get_place2token() {
            writeln!(f, "{}", tokens)?;
        }

        writeln!(f, "# final marking")?;
        for tokens in self.final_marking.get_place2token() {
            writeln!(f, "{}", tokens)?;
        }

        writeln!(f, "# number of transitions\n{}", self.get_number_of_transitions())?;

        for transition in 0..self.get_number_of_transitions() {
            writeln!(f, "# transition {}", transition)?;

            if let Some(label) = self.get_transition_label(transition) {
                writeln!(f, "label {}", label)?;
            } else {
                writeln!(f, "silent")?;
            }
            writeln!(f, "{}", self.move_types[transition])?;
            writeln!(f, "# cost\n{}", self.costs[transition])?;

            writeln!(f, "# number of input places\n{}", self.transition2input_places[transition].len())?;
            for place in &self.transition2input_places[transition] {
                writeln!(f, "{}", place)?;
            }

            writeln!(f, "# number of output places\n{}", self.transition2output_places[transition].len())?;
            for place in &self.transition2output_places[transition] {
                writeln!(f, "{}", place)?;
            }
        }

        write!(f, "")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{MoveType, SynchronousProductNet};

    #[test]
    fn spn_import_export() {
        let fin = fs::read_to_string("testfiles/two-paths.spn").unwrap();
        let net = fin.parse::<SynchronousProductNet>().unwrap();

        assert_eq!(net.get_number_of_places(), 4);
        assert_eq!(net.get_number_of_transitions(), 4);
        assert_eq!(net.get_transition_cost(1), 5);
        assert_eq!(net.get_transition_move_type(0), MoveType::Synchronous);
        assert_eq!(net.get_transition_label(0), Some("a"));
        net.validate().unwrap();

        let again = net.to_string().parse::<SynchronousProductNet>().unwrap();
        assert_eq!(net.to_string(), again.to_string());
    }

    #[test]
    fn spn_two_tokens() {
        let fin = fs::read_to_string("testfiles/two-tokens.spn").unwrap();
        let net = fin.parse::<SynchronousProductNet>().unwrap();

        let error = net.validate().unwrap_err();
        assert!(error.to_string().contains("at most one token"));
    }

    #[test]
    fn spn_unknown_place() {
        let mut net = SynchronousProductNet::new();
        let p0 = net.add_place();
        let t = net.add_transition(None, MoveType::Silent, 0);

        assert!(net.set_final_marking(1, 1).is_err());
        assert!(net.add_transition_place_arc(t, 3).is_err());
        net.add_place_transition_arc(p0, t).unwrap();
        assert!(net.add_place_transition_arc(p0, t).is_err());
    }

    #[test]
    fn spn_empty_final_marking() {
        let mut net = SynchronousProductNet::new();
        let p0 = net.add_place();
        net.set_initial_marking(p0, 1).unwrap();

        assert!(net.validate().is_err());
    }

    #[test]
    fn spn_bad_move_type() {
        let text = "synchronous product net\n1\n1\n1\n1\nsilent\nsideways\n0\n1\n0\n0\n";
        assert!(text.parse::<SynchronousProductNet>().is_err());
    }
}
