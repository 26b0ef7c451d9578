use std::io::Write;

use crate::{
    ebi_framework::{
        ebi_command::EbiCommand,
        ebi_input::EbiInputType,
        ebi_output::{EbiOutput, EbiOutputType},
        infoable::Infoable,
    },
    techniques::unfolding_align::{UnfoldingAlign, UnfoldingParameters},
};

pub const EBI_INFO: EbiCommand = EbiCommand::Command {
    name_short: "info",
    name_long: Some("information"),
    explanation_short: "Show information about a synchronous product net.",
    explanation_long: Some(
        "Show information about a synchronous product net, and the outcome of aligning it by unfolding with the default settings.",
    ),
    cli_command: None,
    input_types: &[&EbiInputType::SynchronousProductNet],
    input_names: &["FILE"],
    input_helps: &["The synchronous product net."],
    execute: |mut inputs, _| {
        let net = inputs.remove(0).to_synchronous_product_net()?;
        let mut f = vec![];

        net.info(&mut f)?;

        match net.align_unfolding(&UnfoldingParameters::default()) {
            Ok(alignment) => alignment.info(&mut f)?,
            Err(e) => writeln!(f, "The net cannot be unfolded: {:#}", e)?,
        }

        Ok(EbiOutput::String(String::from_utf8(f)?))
    },
    output_types: &[&EbiOutputType::String],
};
