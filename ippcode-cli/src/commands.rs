//! Interpreter command: load, execute, report.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

use ippcode_loader::LoadError;
use ippcode_vm::{InputSource, LineInput, Streams};
use log::debug;

use crate::config::RunConfig;

/// Exit code when an input file cannot be opened or read.
pub const EXIT_OPEN: i32 = 11;

/// Load the program named by `config` and execute it.
///
/// `Err` carries the process exit code: 11 for unreadable files, the
/// loader's code for invalid programs, the runtime error's code for faults,
/// and the operand of a non-zero EXIT.
pub fn run(config: &RunConfig) -> Result<(), i32> {
    let bytes = read_source(config.source.as_deref())?;
    let text = String::from_utf8(bytes).map_err(|e| {
        report_load(&LoadError::Malformed {
            message: e.to_string(),
        })
    })?;
    let program = ippcode_loader::load(&text).map_err(|e| report_load(&e))?;
    debug!("loaded {} instructions", program.len());

    let mut input: Box<dyn InputSource> = match &config.input {
        Some(path) => Box::new(LineInput::new(BufReader::new(open(path)?))),
        None => Box::new(LineInput::new(io::stdin().lock())),
    };
    let mut output = io::stdout();
    let mut diagnostics = io::stderr();
    let streams = Streams {
        input: input.as_mut(),
        output: &mut output,
        diagnostics: &mut diagnostics,
    };

    match ippcode_vm::run(&program, streams) {
        Ok(0) => Ok(()),
        Ok(code) => {
            debug!("program exited with code {code}");
            Err(code)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Err(e.exit_code())
        }
    }
}

fn report_load(err: &LoadError) -> i32 {
    eprintln!("error: {err}");
    err.exit_code()
}

fn open(path: &Path) -> Result<File, i32> {
    File::open(path).map_err(|e| {
        eprintln!("error: cannot open '{}': {e}", path.display());
        EXIT_OPEN
    })
}

/// Program text from `path`, or all of standard input.
fn read_source(path: Option<&Path>) -> Result<Vec<u8>, i32> {
    match path {
        Some(path) => fs::read(path).map_err(|e| {
            eprintln!("error: cannot read '{}': {e}", path.display());
            EXIT_OPEN
        }),
        None => {
            let mut bytes = Vec::new();
            io::stdin().lock().read_to_end(&mut bytes).map_err(|e| {
                eprintln!("error: cannot read standard input: {e}");
                EXIT_OPEN
            })?;
            Ok(bytes)
        }
    }
}
