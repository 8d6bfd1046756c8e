use std::fmt::Display;
use std::io::{self, Write};

/// Returned by [`SourceReader::next_character`] once every line is consumed.
pub const END_OF_TEXT: char = '\u{3}';

const ECHO_PREFIX_WIDTH: usize = 4;

/// Feeds the lexer one lower-cased character at a time and owns the
/// diagnostic sink every compiler stage reports into.
pub struct SourceReader<'a> {
    lines: Vec<String>,
    current: Vec<char>,
    line_number: usize,
    column: usize,
    exhausted: bool,
    verbose: bool,
    error_count: usize,
    out: &'a mut dyn Write,
    io_error: Option<io::Error>,
}

impl<'a> SourceReader<'a> {
    pub fn new<I>(lines: I, verbose: bool, out: &'a mut dyn Write) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            lines: lines.into_iter().collect(),
            current: Vec::new(),
            line_number: 0,
            column: 0,
            exhausted: false,
            verbose,
            error_count: 0,
            out,
            io_error: None,
        }
    }

    pub fn from_source(source: &str, verbose: bool, out: &'a mut dyn Write) -> Self {
        Self::new(source.lines().map(String::from), verbose, out)
    }

    pub fn next_character(&mut self) -> char {
        loop {
            if let Some(&c) = self.current.get(self.column) {
                self.column += 1;
                return c.to_lowercase().next().unwrap_or(c);
            }
            if !self.next_line() {
                return END_OF_TEXT;
            }
        }
    }

    fn next_line(&mut self) -> bool {
        if self.exhausted || self.line_number >= self.lines.len() {
            self.exhausted = true;
            self.current.clear();
            self.column = 0;
            return false;
        }

        self.current = self.lines[self.line_number].chars().collect();
        self.current.push('\n');
        self.line_number += 1;
        self.column = 0;

        if self.verbose {
            self.echo_line();
        }
        true
    }

    fn echo_line(&mut self) {
        let text: String = self.current.iter().collect();
        let line = format!("#{:>2}: {}", self.line_number, text.trim_end());
        self.emit(&line);
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            log::error!("failed to write diagnostic: {}", e);
            self.io_error.get_or_insert(e);
        }
    }

    pub fn report(&mut self, message: impl Display) {
        self.error_count += 1;
        if !self.verbose && !self.current.is_empty() {
            self.echo_line();
        }
        let indent = " ".repeat(ECHO_PREFIX_WIDTH + self.column);
        let line = format!("{}E: {}", indent, message);
        self.emit(&line);
    }

    pub fn summarize(&mut self) {
        if self.verbose {
            self.emit("");
            self.emit("Compilation complete");
        }
        let summary = match self.error_count {
            0 => String::from("No errors reported"),
            1 => String::from("1 error reported"),
            n => format!("{} errors reported", n),
        };
        self.emit(&summary);
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Writes a line to the diagnostic sink in verbose mode only.
    pub fn note(&mut self, text: impl Display) {
        if self.verbose {
            self.emit(&text.to_string());
        }
    }

    pub fn take_io_error(&mut self) -> Option<io::Error> {
        self.io_error.take()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn drain(reader: &mut SourceReader) -> String {
        let mut text = String::new();
        loop {
            match reader.next_character() {
                END_OF_TEXT => break,
                c => text.push(c),
            }
        }
        text
    }

    #[test]
    fn test_case_folding_and_line_breaks() {
        let mut out = Vec::new();
        let mut reader = SourceReader::from_source("Procedure P\nIS", false, &mut out);
        assert_eq!(drain(&mut reader), "procedure p\nis\n");
        assert_eq!(reader.next_character(), END_OF_TEXT);
        assert_eq!(reader.next_character(), END_OF_TEXT);
    }

    #[test]
    fn test_empty_source() {
        let mut out = Vec::new();
        let mut reader = SourceReader::from_source("", false, &mut out);
        assert_eq!(reader.next_character(), END_OF_TEXT);
        assert_eq!(reader.line_number(), 0);
    }

    #[test]
    fn test_report_echoes_line_and_aligns() {
        let mut out = Vec::new();
        {
            let mut reader = SourceReader::from_source("x := 1;", false, &mut out);
            reader.next_character();
            reader.next_character();
            reader.report("boom");
            assert_eq!(reader.error_count(), 1);
        }
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "# 1: x := 1;\n      E: boom\n");
    }

    #[test]
    fn test_verbose_echoes_every_line_once() {
        let mut out = Vec::new();
        {
            let mut reader = SourceReader::from_source("a\nb", true, &mut out);
            drain(&mut reader);
            reader.report("late");
            reader.summarize();
        }
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "# 1: a\n# 2: b\n    E: late\n\nCompilation complete\n1 error reported\n"
        );
    }

    #[test]
    fn test_note_is_verbose_only() {
        let mut quiet = Vec::new();
        SourceReader::from_source("", false, &mut quiet).note("*** Entered level 1");
        assert!(quiet.is_empty());

        let mut loud = Vec::new();
        SourceReader::from_source("", true, &mut loud).note("*** Entered level 1");
        assert_eq!(String::from_utf8(loud).unwrap(), "*** Entered level 1\n");
    }

    #[test]
    fn test_summary_wording() {
        let mut out = Vec::new();
        {
            let mut reader = SourceReader::from_source("", false, &mut out);
            reader.summarize();
            reader.report("one");
            reader.report("two");
            reader.summarize();
        }
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.first(), Some(&"No errors reported"));
        assert_eq!(lines.last(), Some(&"2 errors reported"));
    }
}
