use std::time::Duration;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, value_parser};

use crate::{
    ebi_framework::{
        ebi_command::EbiCommand,
        ebi_input::EbiInputType,
        ebi_output::{EbiOutput, EbiOutputType},
    },
    techniques::unfolding_align::{SearchMode, UnfoldingAlign, UnfoldingParameters},
    unfolding::possible_extensions::ExtensionStrategy,
};

pub const EBI_ALIGN: EbiCommand = EbiCommand::Command {
    name_short: "ali",
    name_long: Some("align"),
    explanation_short: "Compute an optimal alignment by unfolding the synchronous product net.",
    explanation_long: Some(
        "Compute an optimal alignment by unfolding the synchronous product net, cheapest events first. \
        The result is the lowest cost of marking the final places, the moves of the accepting events, and statistics of the unfolding.",
    ),
    cli_command: Some(|command| {
        command
            .arg(
                Arg::new("naive")
                    .long("naive")
                    .action(ArgAction::SetTrue)
                    .help("Find new events by combining conditions, rather than incrementally per new condition."),
            )
            .arg(
                Arg::new("blind")
                    .long("blind")
                    .action(ArgAction::SetTrue)
                    .help("Do not estimate the cost to complete; order events by their cost only."),
            )
            .arg(
                Arg::new("exhaustive")
                    .long("exhaustive")
                    .action(ArgAction::SetTrue)
                    .help("Find all accepting events of the lowest cost, rather than the first one."),
            )
            .arg(
                Arg::new("max-steps")
                    .long("max-steps")
                    .action(ArgAction::Set)
                    .value_name("N")
                    .help("Stop after taking this many events from the queue.")
                    .value_parser(value_parser!(usize)),
            )
            .arg(
                Arg::new("timeout")
                    .long("timeout")
                    .action(ArgAction::Set)
                    .value_name("SECONDS")
                    .help("Stop after this many seconds.")
                    .value_parser(value_parser!(f64)),
            )
            .arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Write the result as JSON."),
            )
    }),
    input_types: &[&EbiInputType::SynchronousProductNet],
    input_names: &["FILE"],
    input_helps: &["The synchronous product net to align."],
    execute: |mut inputs, cli_matches| {
        let net = inputs.remove(0).to_synchronous_product_net()?;
        let parameters = parameters_from_cli(cli_matches)?;

        let alignment = net.align_unfolding(&parameters).context("aligning by unfolding")?;

        if cli_matches.get_flag("json") {
            Ok(EbiOutput::Json(alignment.to_json()))
        } else {
            Ok(EbiOutput::UnfoldingAlignment(alignment))
        }
    },
    output_types: &[&EbiOutputType::UnfoldingAlignment, &EbiOutputType::Json],
};

fn parameters_from_cli(cli_matches: &ArgMatches) -> anyhow::Result<UnfoldingParameters> {
    let time_limit = match cli_matches.get_one::<f64>("timeout") {
        Some(seconds) => Some(
            Duration::try_from_secs_f64(*seconds).with_context(|| format!("timeout of {} seconds", seconds))?,
        ),
        None => None,
    };

    Ok(UnfoldingParameters {
        extension_strategy: if cli_matches.get_flag("naive") {
            ExtensionStrategy::Naive
        } else {
            ExtensionStrategy::Incremental
        },
        use_heuristic: !cli_matches.get_flag("blind"),
        search_mode: if cli_matches.get_flag("exhaustive") {
            SearchMode::Exhaustive
        } else {
            SearchMode::FirstSolution
        },
        max_steps: cli_matches.get_one::<usize>("max-steps").copied(),
        time_limit,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        ebi_framework::ebi_command::EBI_COMMANDS, techniques::unfolding_align::SearchMode,
        unfolding::possible_extensions::ExtensionStrategy,
    };

    use super::parameters_from_cli;

    #[test]
    fn parameters() {
        let matches = EBI_COMMANDS
            .build_cli()
            .try_get_matches_from(["ebi_unfolding", "align", "x.spn", "--naive", "--exhaustive", "--timeout", "1.5"])
            .unwrap();
        let parameters = parameters_from_cli(matches.subcommand_matches("align").unwrap()).unwrap();

        assert_eq!(parameters.extension_strategy, ExtensionStrategy::Naive);
        assert_eq!(parameters.search_mode, SearchMode::Exhaustive);
        assert!(parameters.use_heuristic);
        assert_eq!(parameters.max_steps, None);
        assert_eq!(parameters.time_limit, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn negative_timeout() {
        let matches = EBI_COMMANDS
            .build_cli()
            .try_get_matches_from(["ebi_unfolding", "align", "x.spn", "--timeout=-1"])
            .unwrap();
        assert!(parameters_from_cli(matches.subcommand_matches("align").unwrap()).is_err());
    }
}
