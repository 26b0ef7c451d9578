use std::{fmt, time::Duration};

use anyhow::Result;
use serde_json::json;
use strum_macros::{Display, EnumString};

use crate::{
    ebi_framework::{exportable::Exportable, infoable::Infoable},
    ebi_objects::synchronous_product_net::{MoveType, SynchronousProductNet, TransitionIndex},
    unfolding::occurrence_net::EventIndex,
};

pub const HEADER: &str = "unfolding alignment";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
pub enum SearchOutcome {
    /// An occurrence of the accepting transition was popped.
    #[strum(serialize = "found")]
    Found,
    /// No occurrence of the accepting transition exists in the complete prefix.
    #[strum(serialize = "queue exhausted")]
    QueueExhausted,
    /// The step or time limit was reached; solutions found before that are kept.
    #[strum(serialize = "budget exhausted")]
    BudgetExhausted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignmentMove {
    pub transition: TransitionIndex,
    pub label: Option<String>,
    pub move_type: MoveType,
    pub cost: u64,
}

impl fmt::Display for AlignmentMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} move t{} label {} cost {}", self.move_type, self.transition, label, self.cost),
            None => write!(f, "{} move t{} cost {}", self.move_type, self.transition, self.cost),
        }
    }
}

/**
 * An accepting event of the prefix, with the moves of its local configuration in causal order.
 */
#[derive(Clone, Debug)]
pub struct AcceptingEvent {
    pub event: EventIndex,
    pub cost: u64,
    pub moves: Vec<AlignmentMove>,
}

#[derive(Clone, Debug, Default)]
pub struct UnfoldingStatistics {
    pub number_of_events: usize,
    pub number_of_conditions: usize,
    pub number_of_structural_cutoffs: usize,
    pub number_of_pruned_cutoffs: usize,
    pub number_of_pops: usize,
    pub number_of_co_set_queries: usize,
    pub number_of_co_set_cache_hits: usize,
    pub number_of_heuristic_evaluations: usize,
    pub number_of_heuristic_memo_hits: usize,
    pub number_of_distinct_markings: usize,
    pub elapsed: Duration,
}

#[derive(Clone, Debug)]
pub struct UnfoldingAlignment {
    pub outcome: SearchOutcome,
    pub lowest_cost: Option<u64>,
    pub accepting_events: Vec<AcceptingEvent>,
    pub statistics: UnfoldingStatistics,
}

impl UnfoldingAlignment {
    pub fn is_found(&self) -> bool {
        !self.accepting_events.is_empty()
    }

    pub fn get_lowest_cost(&self) -> Option<u64> {
        self.lowest_cost
    }

    pub fn get_number_of_accepting_events(&self) -> usize {
        self.accepting_events.len()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let accepting_events = self
            .accepting_events
            .iter()
            .map(|accepting| {
                json!({
                    "event": accepting.event,
                    "cost": accepting.cost,
                    "moves": accepting.moves.iter().map(|alignment_move| json!({
                        "transition": alignment_move.transition,
                        "label": alignment_move.label,
                        "move type": alignment_move.move_type.to_string(),
                        "cost": alignment_move.cost,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>();

        json!({
            "outcome": self.outcome.to_string(),
            "lowest cost": self.lowest_cost,
            "accepting events": accepting_events,
            "events": self.statistics.number_of_events,
            "conditions": self.statistics.number_of_conditions,
            "structural cutoffs": self.statistics.number_of_structural_cutoffs,
            "pruned cutoffs": self.statistics.number_of_pruned_cutoffs,
            "queue pops": self.statistics.number_of_pops,
            "distinct markings": self.statistics.number_of_distinct_markings,
            "co-set queries": self.statistics.number_of_co_set_queries,
            "co-set cache hits": self.statistics.number_of_co_set_cache_hits,
            "heuristic evaluations": self.statistics.number_of_heuristic_evaluations,
            "heuristic memo hits": self.statistics.number_of_heuristic_memo_hits,
            "elapsed milliseconds": self.statistics.elapsed.as_millis() as u64,
        })
    }
}

/**
 * The moves of an accepting event, taken from the synchronous product net. Transitions beyond the net
 * (the accepting transition) are left out.
 */
pub fn moves_of(net: &SynchronousProductNet, transitions: impl Iterator<Item = TransitionIndex>) -> Vec<AlignmentMove> {
    transitions
        .filter(|transition| *transition < net.get_number_of_transitions())
        .map(|transition| AlignmentMove {
            transition,
            label: net.get_transition_label(transition).map(str::to_string),
            move_type: net.get_transition_move_type(transition),
            cost: net.get_transition_cost(transition),
        })
        .collect()
}

impl Exportable for UnfoldingAlignment {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        Ok(write!(f, "{}", self)?)
    }
}

impl Infoable for UnfoldingAlignment {
    fn info(&self, f: &mut impl std::io::Write) -> Result<()> {
        writeln!(f, "Outcome\t\t\t\t{}", self.outcome)?;
        match self.lowest_cost {
            Some(cost) => writeln!(f, "Lowest cost\t\t\t{}", cost)?,
            None => writeln!(f, "Lowest cost\t\t\tnone")?,
        }
        writeln!(f, "Number of accepting events\t{}", self.accepting_events.len())?;
        writeln!(f, "Number of events\t\t{}", self.statistics.number_of_events)?;
        writeln!(f, "Number of conditions\t\t{}", self.statistics.number_of_conditions)?;
        writeln!(f, "Number of structural cutoffs\t{}", self.statistics.number_of_structural_cutoffs)?;
        writeln!(f, "Number of pruned cutoffs\t{}", self.statistics.number_of_pruned_cutoffs)?;
        writeln!(f, "Number of queue pops\t\t{}", self.statistics.number_of_pops)?;
        writeln!(f, "Number of distinct markings\t{}", self.statistics.number_of_distinct_markings)?;
        writeln!(f, "Elapsed time\t\t\t{:?}", self.statistics.elapsed)?;

        Ok(write!(f, "")?)
    }
}

impl fmt::Display for UnfoldingAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        writeln!(f, "# outcome\n{}", self.outcome)?;
        match self.lowest_cost {
            Some(cost) => writeln!(f, "# lowest cost\n{}", cost)?,
            None => writeln!(f, "# lowest cost\nnone")?,
        }

        writeln!(f, "# number of accepting events\n{}", self.accepting_events.len())?;
        for (i, accepting) in self.accepting_events.iter().enumerate() {
            writeln!(f, "# accepting event {}\ne{}", i, accepting.event)?;
            writeln!(f, "# number of moves\n{}", accepting.moves.len())?;
            for alignment_move in &accepting.moves {
                writeln!(f, "{}", alignment_move)?;
            }
        }

        writeln!(f, "# number of events\n{}", self.statistics.number_of_events)?;
        writeln!(f, "# number of conditions\n{}", self.statistics.number_of_conditions)?;
        writeln!(f, "# number of structural cutoffs\n{}", self.statistics.number_of_structural_cutoffs)?;
        writeln!(f, "# number of pruned cutoffs\n{}", self.statistics.number_of_pruned_cutoffs)?;
        writeln!(f, "# number of queue pops\n{}", self.statistics.number_of_pops)?;
        write!(f, "# elapsed time\n{:?}", self.statistics.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, time::Duration};

    use crate::ebi_objects::synchronous_product_net::{MoveType, SynchronousProductNet};

    use super::{AcceptingEvent, SearchOutcome, UnfoldingAlignment, UnfoldingStatistics, moves_of};

    fn alignment() -> UnfoldingAlignment {
        let fin = fs::read_to_string("testfiles/trace-ab-model-ac.spn").unwrap();
        let net = fin.parse::<SynchronousProductNet>().unwrap();
        UnfoldingAlignment {
            outcome: SearchOutcome::Found,
            lowest_cost: Some(2),
            accepting_events: vec![AcceptingEvent {
                event: 5,
                cost: 2,
                moves: moves_of(&net, [4, 1, 3, 5].into_iter()),
            }],
            statistics: UnfoldingStatistics {
                number_of_events: 6,
                number_of_distinct_markings: 4,
                elapsed: Duration::from_millis(3),
                ..Default::default()
            },
        }
    }

    #[test]
    fn moves_leave_out_accepting_transition() {
        let alignment = alignment();
        let moves = &alignment.accepting_events[0].moves;
        assert_eq!(moves.len(), 3);
        assert_eq!(moves[0].move_type, MoveType::Synchronous);
        assert_eq!(moves[0].label.as_deref(), Some("a"));
        assert_eq!(moves[1].to_string(), "log move t1 label b cost 1");
    }

    #[test]
    fn alignment_json() {
        let json = alignment().to_json();
        assert_eq!(json["outcome"], "found");
        assert_eq!(json["lowest cost"], 2);
        assert_eq!(json["accepting events"][0]["moves"][2]["move type"], "model");
        assert_eq!(json["events"], 6);
        assert_eq!(json["distinct markings"], 4);
        assert_eq!(json["co-set cache hits"], 0);
    }

    #[test]
    fn alignment_text() {
        let text = alignment().to_string();
        assert!(text.starts_with("unfolding alignment\n# outcome\nfound\n# lowest cost\n2\n"));
        assert!(text.contains("synchronous move t4 label a cost 0\n"));
        assert_eq!(SearchOutcome::BudgetExhausted.to_string(), "budget exhausted");
    }
}
