use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use strum_macros::{Display, EnumString};

use crate::{
    ebi_objects::{
        synchronous_product_net::SynchronousProductNet,
        unfolding_alignment::{AcceptingEvent, SearchOutcome, UnfoldingAlignment, UnfoldingStatistics, moves_of},
    },
    marking::PlaceSet,
    unfolding::{
        co_set::CoSetOracle,
        cutoff::CutoffDetector,
        heuristic::HeuristicEstimator,
        occurrence_net::{ConditionIndex, CutoffKind, EventIndex, OccurrenceNet},
        possible_extensions::{Extension, ExtensionStrategy, extensions_naive, extensions_of_condition},
        unfolding_net::UnfoldingNet,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SearchMode {
    /// Stop at the first accepting event.
    #[default]
    FirstSolution,
    /// Keep going until every accepting event of the lowest cost has been found.
    Exhaustive,
}

#[derive(Clone, Debug)]
pub struct UnfoldingParameters {
    pub extension_strategy: ExtensionStrategy,
    pub use_heuristic: bool,
    pub search_mode: SearchMode,
    pub max_steps: Option<usize>,
    pub time_limit: Option<Duration>,
}

impl Default for UnfoldingParameters {
    fn default() -> Self {
        Self {
            extension_strategy: ExtensionStrategy::Incremental,
            use_heuristic: true,
            search_mode: SearchMode::FirstSolution,
            max_steps: None,
            time_limit: None,
        }
    }
}

pub trait UnfoldingAlign {
    /**
     * Computes a cheapest way to mark the final places by unfolding the net, cheapest events first.
     * Not finding an alignment is an outcome, not an error; an invalid net is an error.
     */
    fn align_unfolding(&self, parameters: &UnfoldingParameters) -> Result<UnfoldingAlignment>;
}

impl UnfoldingAlign for SynchronousProductNet {
    fn align_unfolding(&self, parameters: &UnfoldingParameters) -> Result<UnfoldingAlignment> {
        let net = UnfoldingNet::new(self).context("preparing the net for unfolding")?;
        let mut search = Search::new(&net, parameters);
        let outcome = search.run();

        let accepting_events = search
            .accepting_events
            .iter()
            .map(|event| AcceptingEvent {
                event: *event,
                cost: search.occurrence_net.get_event(*event).get_cumulative_cost(),
                moves: moves_of(
                    self,
                    search
                        .occurrence_net
                        .local_configuration(*event)
                        .map(|e| search.occurrence_net.get_event(e).get_transition()),
                ),
            })
            .collect();

        Ok(UnfoldingAlignment {
            outcome,
            lowest_cost: search.lowest_cost,
            accepting_events,
            statistics: UnfoldingStatistics {
                number_of_events: search.occurrence_net.get_number_of_events(),
                number_of_conditions: search.occurrence_net.get_number_of_conditions(),
                number_of_structural_cutoffs: search.cutoffs.get_number_of_cutoffs(),
                number_of_pruned_cutoffs: search.number_of_pruned,
                number_of_pops: search.number_of_pops,
                number_of_co_set_queries: search.oracle.get_number_of_queries(),
                number_of_co_set_cache_hits: search.oracle.get_number_of_cache_hits(),
                number_of_heuristic_evaluations: search.heuristic.get_number_of_evaluations(),
                number_of_heuristic_memo_hits: search.heuristic.get_number_of_memo_hits(),
                number_of_distinct_markings: search.cutoffs.get_number_of_markings(),
                elapsed: search.start.elapsed(),
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueuedEvent {
    priority: u64,
    cumulative_cost: u64,
    event: EventIndex,
}

/**
 * Lowest priority first, then lowest cumulative cost, then the oldest event.
 */
fn compare_events(a: &QueuedEvent, b: &QueuedEvent) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.cumulative_cost.cmp(&b.cumulative_cost))
        .then_with(|| a.event.cmp(&b.event))
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        //BinaryHeap is a max-heap
        compare_events(other, self)
    }
}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Search<'a> {
    net: &'a UnfoldingNet,
    parameters: &'a UnfoldingParameters,
    occurrence_net: OccurrenceNet,
    oracle: CoSetOracle,
    cutoffs: CutoffDetector,
    heuristic: HeuristicEstimator<'a>,
    target: PlaceSet,
    queue: BinaryHeap<QueuedEvent>,
    lowest_cost: Option<u64>,
    accepting_events: Vec<EventIndex>,
    number_of_pruned: usize,
    number_of_pops: usize,
    start: Instant,
}

impl<'a> Search<'a> {
    fn new(net: &'a UnfoldingNet, parameters: &'a UnfoldingParameters) -> Self {
        Self {
            net,
            parameters,
            occurrence_net: OccurrenceNet::new(net.get_number_of_places()),
            oracle: CoSetOracle::new(),
            cutoffs: CutoffDetector::new(),
            heuristic: HeuristicEstimator::new(net),
            target: net.get_accepting_target(),
            queue: BinaryHeap::new(),
            lowest_cost: None,
            accepting_events: vec![],
            number_of_pruned: 0,
            number_of_pops: 0,
            start: Instant::now(),
        }
    }

    fn run(&mut self) -> SearchOutcome {
        log::info!(
            "start unfolding with {} places and {} transitions, {} extensions, heuristic {}, {} mode",
            self.net.get_number_of_places(),
            self.net.get_number_of_transitions(),
            self.parameters.extension_strategy,
            if self.parameters.use_heuristic { "on" } else { "off" },
            self.parameters.search_mode
        );

        let initial = self
            .net
            .get_initial_places()
            .iter()
            .map(|place| self.occurrence_net.add_initial_condition(*place))
            .collect::<Vec<_>>();
        self.extend(initial);

        let outcome = loop {
            if self.is_budget_exhausted() {
                log::info!("budget exhausted after {} pops", self.number_of_pops);
                break SearchOutcome::BudgetExhausted;
            }

            let Some(queued) = self.queue.pop() else {
                break if self.accepting_events.is_empty() {
                    SearchOutcome::QueueExhausted
                } else {
                    SearchOutcome::Found
                };
            };
            self.number_of_pops += 1;
            let event = queued.event;

            if let Some(lowest_cost) = self.lowest_cost {
                if queued.priority > lowest_cost {
                    self.occurrence_net.set_cutoff(event, CutoffKind::Pruned);
                    self.number_of_pruned += 1;
                    continue;
                }
            }

            if self.net.is_accepting_transition(self.occurrence_net.get_event(event).get_transition()) {
                let cost = queued.cumulative_cost;
                log::debug!("accepting event {} with cost {}", event, cost);
                if self.lowest_cost.is_none_or(|lowest_cost| cost < lowest_cost) {
                    self.lowest_cost = Some(cost);
                    self.accepting_events.clear();
                }
                self.accepting_events.push(event);

                if self.parameters.search_mode == SearchMode::FirstSolution {
                    break SearchOutcome::Found;
                }
                continue;
            }

            //the successors of a cutoff are queued, but only accepting ones are used
            if self.occurrence_net.has_cutoff_in_local_configuration(event) {
                continue;
            }

            let postset = self.occurrence_net.expand_event(self.net, event);
            log::trace!("expanded event {} into conditions {:?}", event, postset);
            self.extend(postset);

            if self.cutoffs.is_cutoff(self.net, &mut self.occurrence_net, event) {
                log::debug!(
                    "structural cutoff at event {}, companion {:?}",
                    event,
                    self.cutoffs.get_companion(self.occurrence_net.induced_marking(event))
                );
            }
        };

        log::info!(
            "unfolding ended ({}) after {} pops, with {} events, {} conditions and {} structural cutoffs",
            outcome,
            self.number_of_pops,
            self.occurrence_net.get_number_of_events(),
            self.occurrence_net.get_number_of_conditions(),
            self.cutoffs.get_number_of_cutoffs()
        );
        outcome
    }

    /**
     * Adds and queues the events that the new conditions enable.
     */
    fn extend(&mut self, new_conditions: Vec<ConditionIndex>) {
        let extensions: Vec<Extension> = match self.parameters.extension_strategy {
            ExtensionStrategy::Incremental => {
                let mut result = vec![];
                for condition in new_conditions {
                    result.extend(extensions_of_condition(
                        self.net,
                        &mut self.occurrence_net,
                        &mut self.oracle,
                        condition,
                    ));
                }
                result
            }
            ExtensionStrategy::Naive => {
                let mut result = vec![];
                for seed in 0..self.occurrence_net.get_number_of_conditions() {
                    result.extend(extensions_naive(self.net, &mut self.occurrence_net, &mut self.oracle, vec![seed]));
                }
                result
            }
        };

        for (transition, preset) in extensions {
            //one batch may contain the same extension twice, from different new conditions
            if self.occurrence_net.event_exists(transition, &preset) {
                continue;
            }
            let event = self.occurrence_net.add_event(self.net, transition, preset);

            if self.parameters.use_heuristic {
                let estimate = self.heuristic.estimate(self.occurrence_net.induced_marking(event), &self.target);
                self.occurrence_net.set_heuristic(event, estimate);
            }

            let e = self.occurrence_net.get_event(event);
            log::trace!(
                "new event {} of transition {}, cost {}, estimate {}",
                event,
                transition,
                e.get_cumulative_cost(),
                e.get_heuristic()
            );
            self.queue.push(QueuedEvent {
                priority: e.get_priority(),
                cumulative_cost: e.get_cumulative_cost(),
                event,
            });
        }
    }

    fn is_budget_exhausted(&self) -> bool {
        if let Some(max_steps) = self.parameters.max_steps {
            if self.number_of_pops >= max_steps {
                return true;
            }
        }
        if let Some(time_limit) = self.parameters.time_limit {
            if self.start.elapsed() >= time_limit {
                return true;
            }
        }
        false
    }
}
