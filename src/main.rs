use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use tinyada::compile;

#[derive(Parser)]
#[command(version, about = "Syntax and static semantic analyzer for TinyAda", long_about = None)]
struct Cli {
    /// Path of input TinyAda source file
    file: PathBuf,

    /// Echo every source line as it is read
    #[arg(long, short)]
    verbose: bool,

    /// Also write everything printed to stdout into this file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Raise the log level, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    debug: u8,
}

/// Writes to stdout and, when a log file was requested, mirrors the same
/// bytes into it.
struct Tee<W: Write> {
    primary: W,
    mirror: Option<File>,
}

impl<W: Write> Tee<W> {
    fn new(primary: W, mirror: Option<File>) -> Self {
        Self { primary, mirror }
    }
}

impl<W: Write> Write for Tee<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.primary.write(buf)?;
        if let Some(mirror) = &mut self.mirror {
            mirror.write_all(&buf[..n])?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        if let Some(mirror) = &mut self.mirror {
            mirror.flush()?;
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let text = match fs::read_to_string(&cli.file) {
        Ok(text) => text,
        Err(e) => {
            eprintln!(
                "{}",
                format!("E: invalid filepath or faulty file: {} ({})", cli.file.display(), e)
                    .red()
            );
            process::exit(2);
        }
    };

    let mirror = cli
        .output
        .as_ref()
        .map(File::create)
        .transpose()
        .with_context(|| format!("failed to create output file {:?}", cli.output))?;
    let mirror_clone = mirror
        .as_ref()
        .map(File::try_clone)
        .transpose()
        .context("failed to share output file")?;

    let summary = {
        let mut diagnostics = Tee::new(io::stdout(), mirror);
        let mut output = Tee::new(io::stdout(), mirror_clone);
        let summary = compile(&text, cli.verbose, &mut diagnostics, &mut output)?;
        diagnostics.flush()?;
        output.flush()?;
        summary
    };

    if !summary.is_clean() {
        process::exit(1);
    }
    Ok(())
}
