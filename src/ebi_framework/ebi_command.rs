use std::{
    fmt::{Debug, Display},
    path::PathBuf,
};

use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::{
    ebi_commands::{ebi_command_align, ebi_command_info, ebi_command_state_space, ebi_command_validate},
    ebi_framework::{
        ebi_input::{self, EbiInput, EbiInputType},
        ebi_output::{self, EbiOutput, EbiOutputType},
    },
};

pub const EBI_COMMANDS: EbiCommand = EbiCommand::Group {
    name_short: "ebi_unfolding",
    name_long: None,
    explanation_short: "Optimal alignments of synchronous product nets by unfolding.",
    explanation_long: None,
    children: &[
        &ebi_command_align::EBI_ALIGN,
        &ebi_command_info::EBI_INFO,
        &ebi_command_state_space::EBI_STATE_SPACE,
        &ebi_command_validate::EBI_VALIDATE,
    ],
};

pub const ARG_SHORT_OUTPUT: char = 'o';
pub const ARG_ID_OUTPUT: &str = "output";

pub enum EbiCommand {
    Group {
        name_short: &'static str,
        name_long: Option<&'static str>,
        explanation_short: &'static str,
        explanation_long: Option<&'static str>,
        children: &'static [&'static EbiCommand],
    },
    Command {
        name_short: &'static str,
        name_long: Option<&'static str>,
        explanation_short: &'static str,
        explanation_long: Option<&'static str>,
        cli_command: Option<fn(command: Command) -> Command>, //create the cli command. An output -o argument is always added

        input_types: &'static [&'static EbiInputType], //for each fixed-position input parameter, the type of file that is accepted
        input_names: &'static [&'static str],
        input_helps: &'static [&'static str],

        execute: fn(inputs: Vec<EbiInput>, cli_matches: &ArgMatches) -> Result<EbiOutput>,
        output_types: &'static [&'static EbiOutputType],
    },
}

impl EbiCommand {
    pub fn build_cli(&self) -> Command {
        let mut command;
        match self {
            EbiCommand::Group {
                name_short,
                name_long,
                explanation_short,
                explanation_long,
                children,
            } => {
                let name = if let Some(x) = name_long { x } else { name_short };
                command = Command::new(name)
                    .about(explanation_short)
                    .subcommand_required(true)
                    .allow_external_subcommands(false);

                if name_long.is_some() {
                    command = command.alias(name_short);
                }

                if let Some(l) = explanation_long {
                    command = command.long_about(l);
                }

                for child in children.iter() {
                    command = command.subcommand(child.build_cli());
                }
            }
            EbiCommand::Command {
                name_short,
                name_long,
                explanation_short,
                explanation_long,
                cli_command,
                input_types,
                input_names,
                input_helps,
                ..
            } => {
                let name = if let Some(x) = name_long { x } else { name_short };
                command = Command::new(name).about(explanation_short);

                if name_long.is_some() {
                    command = command.alias(name_short);
                }

                if let Some(l) = explanation_long {
                    command = command.long_about(l);
                }

                for (i, (input_name, (input_type, input_help))) in
                    input_names.iter().zip(input_types.iter().zip(input_helps.iter())).enumerate()
                {
                    let arg = Arg::new(format!("{}x{}", input_name, i))
                        .action(ArgAction::Set)
                        .value_name(input_name)
                        .help(input_help)
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .long_help(format!(
                            "{} {} (.{}); use - to read from standard input.",
                            input_type.get_article(),
                            input_type,
                            input_type.get_file_extension()
                        ));

                    command = command.arg(arg);
                }

                if let Some(f) = cli_command {
                    command = (f)(command);
                }

                command = command.arg(
                    Arg::new(ARG_ID_OUTPUT)
                        .short(ARG_SHORT_OUTPUT)
                        .long(ARG_ID_OUTPUT)
                        .action(ArgAction::Set)
                        .value_name("FILE")
                        .help("Saves the result to a file.")
                        .required(false)
                        .value_parser(value_parser!(PathBuf)),
                );
            }
        };
        command
    }

    pub fn long_name(&self) -> &str {
        match self {
            EbiCommand::Group {
                name_short, name_long, ..
            } => name_long.unwrap_or(*name_short),
            EbiCommand::Command {
                name_short, name_long, ..
            } => name_long.unwrap_or(*name_short),
        }
    }

    pub fn execute(&self, cli_matches: &ArgMatches) -> Result<()> {
        match self {
            EbiCommand::Group { children, .. } => {
                for child in children.iter() {
                    if let Some(sub_matches) = cli_matches.subcommand_matches(child.long_name()) {
                        return child.execute(sub_matches);
                    }
                }
            }
            EbiCommand::Command {
                input_types,
                input_names,
                execute,
                output_types,
                ..
            } => {
                //read the inputs
                let mut inputs = vec![];
                for (i, (input_type, input_name)) in input_types.iter().zip(input_names.iter()).enumerate() {
                    let cli_id = format!("{}x{}", input_name, i);

                    log::info!("Reading {}", input_name);
                    let mut reader = ebi_input::get_reader(cli_matches, &cli_id).context("Getting reader.")?;
                    let input = input_type.read(&mut reader).with_context(|| format!("Reading parameter {}.", input_name))?;
                    inputs.push(input);
                }

                log::info!("Starting {}", self.long_name());

                let result = (execute)(inputs, cli_matches)?;

                if !output_types.contains(&&result.get_type()) {
                    return Err(anyhow!(
                        "Output type {} does not match the declared output of {}.",
                        result.get_type(),
                        self
                    ));
                }

                if let Some(to_file) = cli_matches.get_one::<PathBuf>(ARG_ID_OUTPUT) {
                    log::info!("Writing result to {:?} as {}", to_file, result.get_type());
                    ebi_output::export_object(to_file, result)?;
                } else {
                    log::info!("Writing result as {}", result.get_type());
                    print!("{}", ebi_output::export_to_string(result)?);
                }

                return Ok(());
            }
        }
        Err(anyhow!("command not recognised"))
    }
}

impl Display for EbiCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.long_name())
    }
}

impl Debug for EbiCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group {
                name_short, name_long, ..
            } => f
                .debug_struct("Group")
                .field("name_short", name_short)
                .field("name_long", name_long)
                .finish(),
            Self::Command {
                name_short, name_long, ..
            } => f
                .debug_struct("Command")
                .field("name_short", name_short)
                .field("name_long", name_long)
                .finish(),
        }
    }
}
