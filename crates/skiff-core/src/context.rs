use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::error::SkiffError;

/// Per-interpreter evaluation state. Holds the output sink the printing
/// builtins write to; the sink is injected at construction and lives for
/// the interpreter's lifetime.
pub struct EvalContext {
    out: RefCell<Box<dyn Write>>,
}

impl EvalContext {
    /// Context writing to process standard output.
    pub fn new() -> Self {
        EvalContext {
            out: RefCell::new(Box::new(io::stdout())),
        }
    }

    pub fn with_output(out: Box<dyn Write>) -> Self {
        EvalContext {
            out: RefCell::new(out),
        }
    }

    pub fn write_str(&self, s: &str) -> Result<(), SkiffError> {
        self.out
            .borrow_mut()
            .write_all(s.as_bytes())
            .map_err(|e| SkiffError::Io(e.to_string()))
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

/// An in-memory output sink. Clones share the same buffer, so a test can
/// hand one to the interpreter and read what was written afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter(Rc<RefCell<Vec<u8>>>);

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
