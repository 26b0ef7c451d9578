use anyhow::{Context, Result, anyhow};
use std::io::BufRead;

pub struct LineReader<'a> {
    reader: &'a mut dyn BufRead,
    line_no: usize,
    line: String,
}

impl<'a> LineReader<'a> {
    pub fn new(reader: &'a mut (dyn BufRead + 'a)) -> Self {
        LineReader::<'a> {
            reader: reader,
            line_no: 0,
            line: String::new(),
        }
    }

    pub fn get_last_line_number(&self) -> usize {
        self.line_no
    }

    pub fn get_last_line(&self) -> &str {
        &self.line
    }

    pub fn next_line_raw(&mut self) -> Result<()> {
        self.line.clear();

        match self.reader.read_line(&mut self.line) {
            Ok(0) => return Err(anyhow!("premature end of file")),
            Ok(_n) => {
                if self.line.ends_with('\n') {
                    self.line.pop();
                    if self.line.ends_with('\r') {
                        self.line.pop();
                    }
                }
                self.line_no += 1;
                return Ok(());
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn next_line_string(&mut self) -> Result<String> {
        self.next_line()?;
        Ok(self.get_last_line().to_string())
    }

    pub fn next_line_index(&mut self) -> Result<usize> {
        self.next_line()?;
        self.get_last_line()
            .trim()
            .parse::<usize>()
            .with_context(|| {
                format!(
                    "failed to read integer at line {}; found `{}`",
                    self.get_last_line_number(),
                    self.get_last_line()
                )
            })
    }

    pub fn next_line_natural(&mut self) -> Result<u64> {
        self.next_line()?;
        self.get_last_line().trim().parse::<u64>().with_context(|| {
            format!(
                "failed to read integer at line {}; found `{}`",
                self.get_last_line_number(),
                self.get_last_line()
            )
        })
    }

    /**
     * Reads the next line that is neither a comment (starting with `#`) nor blank.
     */
    pub fn next_line(&mut self) -> Result<()> {
        self.next_line_raw()?;
        while {
            let line = self.get_last_line().trim_start();
            line.starts_with('#') || line.is_empty()
        } {
            self.next_line_raw()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::LineReader;

    #[test]
    fn skips_comments_and_blank_lines() {
        let mut reader = Cursor::new("# header\n\n  7\r\n# more\nsilent\n");
        let mut lreader = LineReader::new(&mut reader);

        assert_eq!(lreader.next_line_index().unwrap(), 7);
        assert_eq!(lreader.get_last_line_number(), 3);
        assert_eq!(lreader.next_line_string().unwrap(), "silent");
        assert!(lreader.next_line().is_err());
    }

    #[test]
    fn reports_line_of_bad_number() {
        let mut reader = Cursor::new("x\n");
        let mut lreader = LineReader::new(&mut reader);

        let error = lreader.next_line_natural().unwrap_err();
        assert!(format!("{:#}", error).contains("line 1"));
    }
}
