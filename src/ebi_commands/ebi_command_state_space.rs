use std::fmt::Write;

use anyhow::Context;

use crate::{
    ebi_framework::{
        ebi_command::EbiCommand,
        ebi_input::EbiInputType,
        ebi_output::{EbiOutput, EbiOutputType},
    },
    ebi_objects::unfolding_alignment::moves_of,
    techniques::state_space_align::StateSpaceAlign,
};

pub const EBI_STATE_SPACE: EbiCommand = EbiCommand::Command {
    name_short: "ss",
    name_long: Some("state-space"),
    explanation_short: "Compute an optimal alignment by a shortest-path search over the reachable markings.",
    explanation_long: Some(
        "Compute an optimal alignment by a shortest-path search over the reachable markings of the synchronous product net, without unfolding it. \
        This search may take much longer on nets with a lot of concurrency.",
    ),
    cli_command: None,
    input_types: &[&EbiInputType::SynchronousProductNet],
    input_names: &["FILE"],
    input_helps: &["The synchronous product net to align."],
    execute: |mut inputs, _| {
        let net = inputs.remove(0).to_synchronous_product_net()?;

        let mut f = String::new();
        match net.align_state_space().context("aligning by state-space search")? {
            Some((transitions, cost)) => {
                writeln!(f, "cost {}", cost)?;
                for alignment_move in moves_of(&net, transitions.into_iter()) {
                    writeln!(f, "{}", alignment_move)?;
                }
            }
            None => writeln!(f, "no alignment: the final marking cannot be reached")?,
        }

        Ok(EbiOutput::String(f))
    },
    output_types: &[&EbiOutputType::String],
};
