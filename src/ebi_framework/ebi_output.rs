use std::{
    fmt::{self, Display},
    fs::File,
    io::Write,
    path::PathBuf,
};

use anyhow::{Context, Result};

use crate::{ebi_framework::exportable::Exportable, ebi_objects::unfolding_alignment::UnfoldingAlignment};

pub enum EbiOutput {
    String(String),
    Json(serde_json::Value),
    UnfoldingAlignment(UnfoldingAlignment),
}

impl EbiOutput {
    pub fn get_type(&self) -> EbiOutputType {
        match self {
            EbiOutput::String(_) => EbiOutputType::String,
            EbiOutput::Json(_) => EbiOutputType::Json,
            EbiOutput::UnfoldingAlignment(_) => EbiOutputType::UnfoldingAlignment,
        }
    }

    pub fn export(&self, f: &mut dyn Write) -> Result<()> {
        match self {
            EbiOutput::String(object) => object.export(f),
            EbiOutput::Json(object) => object.export(f),
            EbiOutput::UnfoldingAlignment(object) => object.export(f),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum EbiOutputType {
    String,
    Json,
    UnfoldingAlignment,
}

impl Display for EbiOutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EbiOutputType::String => Display::fmt(&"text", f),
            EbiOutputType::Json => Display::fmt(&"JSON", f),
            EbiOutputType::UnfoldingAlignment => Display::fmt(&"unfolding alignment", f),
        }
    }
}

pub fn export_object(to_file: &PathBuf, object: EbiOutput) -> Result<()> {
    let file = File::create(to_file).with_context(|| format!("Writing result to file {:?}.", to_file))?;
    let mut writer = std::io::BufWriter::new(&file);
    object.export(&mut writer).with_context(|| format!("Writing result to file {:?}.", to_file))?;
    writer.flush().with_context(|| format!("writing result to file {:?}", to_file))
}

pub fn export_to_string(object: EbiOutput) -> Result<String> {
    let mut f = vec![];
    object.export(&mut f)?;
    Ok(String::from_utf8(f)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{EbiOutput, EbiOutputType, export_to_string};

    #[test]
    fn export_json() {
        let output = EbiOutput::Json(json!({"lowest cost": 2}));
        assert_eq!(output.get_type(), EbiOutputType::Json);
        let text = export_to_string(output).unwrap();
        assert!(text.contains("\"lowest cost\": 2"));
    }
}
