use std::io::Write;

use anyhow::Context;

pub mod lexer;
pub mod parser;
pub mod source;
pub mod symbol_table;

use lexer::Lexer;
use parser::Parser;
use source::SourceReader;

/// Outcome of one compilation run. Printed values go to the output sink and
/// diagnostics to the diagnostic sink; this only records how the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub error_count: usize,
    /// A syntax error stopped the parse before the end of the input.
    pub aborted: bool,
}

impl Summary {
    pub fn is_clean(&self) -> bool {
        self.error_count == 0
    }
}

pub fn compile<'a>(
    source: &str,
    verbose: bool,
    diagnostics: &'a mut dyn Write,
    output: &'a mut dyn Write,
) -> anyhow::Result<Summary> {
    log::info!("compiling {} lines", source.lines().count());

    let reader = SourceReader::from_source(source, verbose, diagnostics);
    let mut parser = Parser::new(Lexer::new(reader), output);

    let aborted = match parser.compilation() {
        Ok(()) => false,
        Err(e) => {
            log::debug!("compilation aborted at {:?}: {}", e.token, e);
            true
        }
    };

    let (mut reader, output_error) = parser.finish();
    reader.summarize();

    if let Some(e) = reader.take_io_error() {
        return Err(e).context("failed to write diagnostics");
    }
    if let Some(e) = output_error {
        return Err(e).context("failed to write program output");
    }

    Ok(Summary {
        error_count: reader.error_count(),
        aborted,
    })
}
