use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tinyada::{compile, Summary};

fn fixture(name: &str) -> String {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "files", name]
        .iter()
        .collect();
    fs::read_to_string(path).unwrap()
}

fn run(source: &str, verbose: bool) -> (Summary, String, String) {
    let mut diagnostics = Vec::new();
    let mut output = Vec::new();
    let summary = compile(source, verbose, &mut diagnostics, &mut output).unwrap();
    (
        summary,
        String::from_utf8(diagnostics).unwrap(),
        String::from_utf8(output).unwrap(),
    )
}

#[test]
fn test_clean_program() {
    let (summary, diagnostics, output) = run(&fixture("clean.ada"), false);
    assert_eq!(
        summary,
        Summary {
            error_count: 0,
            aborted: false
        }
    );
    assert!(summary.is_clean());
    assert_eq!(diagnostics, "No errors reported\n");
    assert_eq!(output, "14\n2\n1\n");
}

#[test]
fn test_semantic_errors_do_not_abort() {
    let (summary, diagnostics, output) = run(&fixture("errors.ada"), false);
    assert_eq!(summary.error_count, 4);
    assert!(!summary.aborted);
    assert!(diagnostics.contains("# 3:    X : Boolean;"));
    assert!(diagnostics.contains("E: identifier `x` already declared in this block"));
    assert!(diagnostics.contains("E: variable or parameter name expected"));
    assert!(diagnostics.contains("E: undeclared identifier `y`"));
    assert!(diagnostics.contains("E: unknown symbol '?'"));
    assert!(diagnostics.ends_with("4 errors reported\n"));
    assert_eq!(output, "10\n");
}

#[test]
fn test_syntax_error_aborts() {
    let (summary, diagnostics, output) = run(&fixture("syntax_error.ada"), false);
    assert_eq!(summary.error_count, 2);
    assert!(summary.aborted);
    assert!(diagnostics.contains("E: undeclared identifier `y`"));
    assert!(diagnostics.contains("E: 'end' expected, got end of input"));
    assert!(diagnostics.ends_with("2 errors reported\n"));
    assert_eq!(output, "");
}

#[test]
fn test_verbose_echoes_source_and_scopes() {
    let source = "procedure P is\nbegin\n  null;\nend P;";
    let (summary, diagnostics, _) = run(source, true);
    assert!(summary.is_clean());

    let echoed: Vec<_> = diagnostics
        .lines()
        .filter(|l| l.starts_with('#') || l.starts_with("***"))
        .collect();
    assert_eq!(
        echoed,
        vec![
            "# 1: procedure P is",
            "*** Entered level 0",
            "*** Entered level 1",
            "# 2: begin",
            "# 3:   null;",
            "# 4: end P;",
            "*** Symbol table for level 1",
            "*** Exited level 1",
            "*** Symbol table for level 0",
            "*** Exited level 0",
        ]
    );
    assert!(diagnostics
        .lines()
        .any(|l| l.starts_with("Name:p ") && l.contains("Role:Procedure")));
    assert!(diagnostics.ends_with(
        "*** Exited level 0\n\nCompilation complete\nNo errors reported\n"
    ));
}

#[test]
fn test_scope_trace_needs_verbose() {
    let (_, diagnostics, _) = run("procedure p is begin null; end p;", false);
    assert_eq!(diagnostics, "No errors reported\n");
}

#[test]
fn test_single_error_wording() {
    let (summary, diagnostics, _) = run("procedure p is begin null; end q;", false);
    assert_eq!(summary.error_count, 1);
    assert!(diagnostics.contains("E: undeclared identifier `q`"));
    assert!(diagnostics.ends_with("1 error reported\n"));
}

#[test]
fn test_print_division_by_zero() {
    let (summary, diagnostics, output) =
        run("procedure p is begin print(10 / 0); end p;", false);
    assert_eq!(summary.error_count, 2);
    assert!(summary.aborted);
    assert!(diagnostics.contains("E: division by zero in constant expression"));
    assert!(diagnostics.contains("E: illegal print operand"));
    assert_eq!(output, "");
}

#[test]
fn test_empty_source() {
    let (summary, diagnostics, _) = run("", false);
    assert!(summary.aborted);
    assert_eq!(summary.error_count, 1);
    assert!(diagnostics.contains("E: 'procedure' expected, got end of input"));
}

#[test]
fn test_case_insensitive_names() {
    let source = "PROCEDURE Calc IS N : CONSTANT := 6; BEGIN PRINT(n * 7); END calc;";
    let (summary, _, output) = run(source, false);
    assert!(summary.is_clean());
    assert_eq!(output, "42\n");
}

#[test]
fn test_overflow_before_print_is_reported() {
    let (summary, diagnostics, output) = run(
        "procedure p is begin print(0 - 9223372036854775807 - 2); end p;",
        false,
    );
    assert_eq!(summary.error_count, 2);
    assert!(summary.aborted);
    assert!(diagnostics.contains("E: integer overflow in constant expression"));
    assert!(diagnostics.contains("E: illegal print operand"));
    assert_eq!(output, "");
}

struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink down"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_broken_output_sink() {
    let mut diagnostics = Vec::new();
    let err = compile(
        "procedure p is begin print(1); print(2); end p;",
        false,
        &mut diagnostics,
        &mut BrokenSink,
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "failed to write program output");
    assert_eq!(format!("{:#}", err), "failed to write program output: sink down");
    assert_eq!(String::from_utf8(diagnostics).unwrap(), "No errors reported\n");
}

#[test]
fn test_broken_diagnostic_sink() {
    let mut output = Vec::new();
    let err = compile(
        "procedure p is begin print(1); q; print(2); end p;",
        false,
        &mut BrokenSink,
        &mut output,
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "failed to write diagnostics");
    assert_eq!(format!("{:#}", err), "failed to write diagnostics: sink down");
    assert_eq!(String::from_utf8(output).unwrap(), "1\n2\n");
}
