use anyhow::Context;

use crate::{
    ebi_framework::{
        ebi_command::EbiCommand,
        ebi_input::EbiInputType,
        ebi_output::{EbiOutput, EbiOutputType},
    },
    ebi_objects::synchronous_product_net::SynchronousProductNet,
};

pub const EBI_VALIDATE: EbiCommand = EbiCommand::Command {
    name_short: "vali",
    name_long: Some("validate"),
    explanation_short: "Parse a synchronous product net and check that it can be unfolded, and return an error if necessary.",
    explanation_long: None,
    cli_command: None,
    input_types: &[&EbiInputType::SynchronousProductNet],
    input_names: &["FILE"],
    input_helps: &["The synchronous product net to validate."],
    execute: |mut inputs, _| {
        let net: SynchronousProductNet = inputs.remove(0).to_synchronous_product_net()?;
        net.validate().context("validating the file")?;
        Ok(EbiOutput::String(format!(
            "Object is a valid synchronous product net with {} places and {} transitions.",
            net.get_number_of_places(),
            net.get_number_of_transitions()
        )))
    },
    output_types: &[&EbiOutputType::String],
};
