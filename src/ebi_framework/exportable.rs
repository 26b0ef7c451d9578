use anyhow::Result;

pub trait Exportable {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()>;
}

impl Exportable for String {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        Ok(writeln!(f, "{}", self)?)
    }
}

impl Exportable for serde_json::Value {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *f, self)?;
        Ok(writeln!(f)?)
    }
}
