//! Integration tests for the IPPcode22 CLI.
//!
//! These tests invoke the `ippcode` binary as a subprocess and check
//! exit codes, stdout, and stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn ippcode() -> Command {
    Command::cargo_bin("ippcode").unwrap()
}

/// Return the absolute path to a test program file.
fn test_program(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/programs")
        .join(name)
}

/// Write `content` to `name` inside `dir`, returning the path.
fn write_temp(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn source_arg(path: &Path) -> String {
    format!("--source={}", path.display())
}

// ---- Arguments ----

#[test]
fn no_args_exits_10() {
    ippcode()
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("--source"));
}

#[test]
fn unknown_flag_exits_10() {
    ippcode()
        .args(["--source", "x.xml", "--frobnicate"])
        .assert()
        .failure()
        .code(10);
}

#[test]
fn help_flag_exits_0() {
    ippcode()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--source"))
        .stdout(predicate::str::contains("--input"));
}

#[test]
fn missing_source_file_exits_11() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.xml");
    ippcode()
        .arg(source_arg(&missing))
        .assert()
        .failure()
        .code(11)
        .stderr(predicate::str::contains("error: cannot read"));
}

#[test]
fn missing_input_file_exits_11() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.txt");
    ippcode()
        .arg(source_arg(&test_program("hello.xml")))
        .arg(format!("--input={}", missing.display()))
        .assert()
        .failure()
        .code(11)
        .stderr(predicate::str::contains("error: cannot open"));
}

// ---- Running programs ----

#[test]
fn hello_world() {
    ippcode()
        .arg(source_arg(&test_program("hello.xml")))
        .assert()
        .success()
        .stdout("Hello, world!\n");
}

#[test]
fn source_from_stdin() {
    let dir = TempDir::new().unwrap();
    let input = write_temp(&dir, "input.txt", "");
    ippcode()
        .arg(format!("--input={}", input.display()))
        .write_stdin(fs::read_to_string(test_program("hello.xml")).unwrap())
        .assert()
        .success()
        .stdout("Hello, world!\n");
}

#[test]
fn input_from_stdin() {
    ippcode()
        .arg(source_arg(&test_program("factorial.xml")))
        .write_stdin("5\n")
        .assert()
        .success()
        .stdout("120\n");
}

#[test]
fn input_from_file() {
    let dir = TempDir::new().unwrap();
    let input = write_temp(&dir, "input.txt", "6\n");
    ippcode()
        .arg(source_arg(&test_program("factorial.xml")))
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout("720\n");
}

#[test]
fn call_and_operand_stack() {
    ippcode()
        .arg(source_arg(&test_program("stack_call.xml")))
        .assert()
        .success()
        .stdout("42");
}

#[test]
fn exit_instruction_sets_status() {
    ippcode()
        .arg(source_arg(&test_program("exit_code.xml")))
        .assert()
        .failure()
        .code(7)
        .stdout("before");
}

#[test]
fn diagnostics_go_to_stderr() {
    ippcode()
        .arg(source_arg(&test_program("debug.xml")))
        .assert()
        .success()
        .stdout("done")
        .stderr(predicate::str::contains("5-- BREAK --"))
        .stderr(predicate::str::contains("GF: x=int@5"));
}

// ---- Errors ----

#[test]
fn runtime_error_reports_once() {
    ippcode()
        .arg(source_arg(&test_program("divide_by_zero.xml")))
        .assert()
        .failure()
        .code(57)
        .stdout("")
        .stderr(predicate::str::contains(
            "error: division by zero at instruction 2",
        ));
}

#[test]
fn malformed_xml_exits_31() {
    ippcode()
        .arg(source_arg(&test_program("unclosed.xml")))
        .assert()
        .failure()
        .code(31)
        .stderr(predicate::str::contains("error: malformed XML"));
}

#[test]
fn invalid_utf8_exits_31() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("binary.xml");
    fs::write(&path, [0x3c, 0xff, 0xfe, 0x3e]).unwrap();
    ippcode().arg(source_arg(&path)).assert().failure().code(31);
}

#[test]
fn bad_structure_exits_32() {
    ippcode()
        .arg(source_arg(&test_program("wrong_arity.xml")))
        .assert()
        .failure()
        .code(32)
        .stderr(predicate::str::contains("MOVE expects 2 argument(s), found 1"));
}

#[test]
fn wrong_language_exits_32() {
    let dir = TempDir::new().unwrap();
    let path = write_temp(&dir, "prog.xml", r#"<program language="IPPcode21"/>"#);
    ippcode()
        .arg(source_arg(&path))
        .assert()
        .failure()
        .code(32)
        .stderr(predicate::str::contains("IPPcode21"));
}

#[test]
fn undefined_variable_exits_54() {
    let dir = TempDir::new().unwrap();
    let path = write_temp(
        &dir,
        "prog.xml",
        r#"<program language="IPPcode22">
             <instruction order="3" opcode="WRITE"><arg1 type="var">GF@ghost</arg1></instruction>
           </program>"#,
    );
    ippcode()
        .arg(source_arg(&path))
        .assert()
        .failure()
        .code(54)
        .stderr(predicate::str::contains("GF@ghost"));
}

#[test]
fn logging_is_silent_by_default() {
    ippcode()
        .arg(source_arg(&test_program("hello.xml")))
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr("");
}
