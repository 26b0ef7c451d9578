use std::{
    fmt::{self, Display},
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;

use crate::{
    ebi_framework::importable::Importable, ebi_objects::synchronous_product_net::SynchronousProductNet,
};

pub enum EbiInput {
    SynchronousProductNet(SynchronousProductNet),
}

impl EbiInput {
    pub fn get_type(&self) -> EbiInputType {
        match self {
            EbiInput::SynchronousProductNet(_) => EbiInputType::SynchronousProductNet,
        }
    }

    pub fn to_synchronous_product_net(self) -> Result<SynchronousProductNet> {
        match self {
            EbiInput::SynchronousProductNet(net) => Ok(net),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EbiInputType {
    SynchronousProductNet,
}

impl EbiInputType {
    pub fn get_article(&self) -> &str {
        match self {
            EbiInputType::SynchronousProductNet => "a",
        }
    }

    pub fn get_file_extension(&self) -> &str {
        match self {
            EbiInputType::SynchronousProductNet => "spn",
        }
    }

    pub fn read(&self, reader: &mut dyn BufRead) -> Result<EbiInput> {
        match self {
            EbiInputType::SynchronousProductNet => Ok(EbiInput::SynchronousProductNet(
                SynchronousProductNet::import(reader).with_context(|| format!("parsing as {} {}", self.get_article(), self))?,
            )),
        }
    }
}

impl Display for EbiInputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EbiInputType::SynchronousProductNet => write!(f, "synchronous product net"),
        }
    }
}

/**
 * A reader for the file given on the command line, where `-` stands for standard input.
 */
pub fn get_reader(cli_matches: &ArgMatches, cli_id: &str) -> Result<Box<dyn BufRead>> {
    match cli_matches.get_one::<PathBuf>(cli_id) {
        Some(path) if path.as_os_str() == "-" => Ok(Box::new(BufReader::new(io::stdin()))),
        Some(path) => get_reader_file(path),
        None => Err(anyhow!("no input file given for {}", cli_id)),
    }
}

pub fn get_reader_file(path: &PathBuf) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("could not read file `{}`", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}
