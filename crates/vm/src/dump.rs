//! BREAK: a snapshot of the VM state on the diagnostic stream.

use std::fmt;
use std::io::Write;

use log::warn;

use crate::frame::Frame;
use crate::machine::VM;

impl<'a> VM<'a> {
    /// Write the current position, frames, stack depths and instruction
    /// count to the diagnostic stream. Write failures are logged, not
    /// raised.
    pub(crate) fn dump(&mut self) {
        let report = self.render_dump();
        let out = &mut *self.streams.diagnostics;
        if let Err(err) = out.write_all(report.as_bytes()).and_then(|()| out.flush()) {
            warn!("BREAK dump failed: {err}");
        }
    }

    /// Text written by BREAK.
    pub fn render_dump(&self) -> String {
        Snapshot(self).to_string()
    }
}

/// Display adapter for the BREAK report.
struct Snapshot<'v, 'a>(&'v VM<'a>);

impl fmt::Display for Snapshot<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vm = self.0;
        let order = vm.program.get(vm.pc).map_or(0, |instr| instr.order);
        writeln!(f, "-- BREAK --")?;
        writeln!(f, "position: {} (order {})", vm.pc + 1, order)?;
        writeln!(f, "executed: {}", vm.executed)?;
        write_frame(f, "GF", Some(vm.frames.global()))?;
        write_frame(f, "LF", vm.frames.local())?;
        write_frame(f, "TF", vm.frames.temporary())?;
        writeln!(f, "frame stack depth: {}", vm.frames.depth())?;
        write!(f, "data stack ({}):", vm.data_stack.len())?;
        for value in vm.data_stack.iter() {
            write!(f, " {}", value.describe())?;
        }
        writeln!(f)?;
        writeln!(f, "call stack depth: {}", vm.call_stack.len())?;
        writeln!(f, "-----------")
    }
}

fn write_frame(f: &mut fmt::Formatter<'_>, name: &str, frame: Option<&Frame>) -> fmt::Result {
    let Some(frame) = frame else {
        return writeln!(f, "{name}: <not created>");
    };
    write!(f, "{name}:")?;
    if frame.is_empty() {
        write!(f, " <empty>")?;
    }
    for (var, value) in frame.iter() {
        write!(f, " {var}={}", value.describe())?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use ippcode_common::Program;

    use crate::io::{LineInput, Streams};
    use crate::machine::VM;

    #[test]
    fn fresh_vm_report() {
        let program = Program::default();
        let mut input = LineInput::new(Cursor::new(""));
        let mut output = io::sink();
        let mut diagnostics = io::sink();
        let vm = VM::new(
            &program,
            Streams {
                input: &mut input,
                output: &mut output,
                diagnostics: &mut diagnostics,
            },
        );
        assert_eq!(
            vm.render_dump(),
            "-- BREAK --\n\
             position: 1 (order 0)\n\
             executed: 0\n\
             GF: <empty>\n\
             LF: <not created>\n\
             TF: <not created>\n\
             frame stack depth: 0\n\
             data stack (0):\n\
             call stack depth: 0\n\
             -----------\n"
        );
    }
}
