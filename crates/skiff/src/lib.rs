//! Skiff: a small embeddable Scheme.
//!
//! Program data is a uniform tagged [`Value`]; compound data lives in
//! mutable, shared cons cells; evaluation threads an environment chain
//! through special forms, closures, and native procedures.
//!
//! ```
//! use skiff::{Interpreter, Value};
//!
//! let interp = Interpreter::new();
//! let result = interp.eval_str("demo", "(+ 1 2 3)").unwrap();
//! assert_eq!(result, Value::int(6));
//! ```
//!
//! Output from `display`/`newline` goes to an injectable sink:
//!
//! ```
//! use skiff::{Interpreter, MemoryWriter};
//!
//! let out = MemoryWriter::new();
//! let interp = Interpreter::with_output(Box::new(out.clone()));
//! interp.eval_str("demo", "(display \"hi\") (newline)").unwrap();
//! assert_eq!(out.contents(), "hi\n");
//! ```

pub use skiff_core::{
    Env, EvalContext, MemoryWriter, NativeFn, Number, Pair, SkiffError, Span, Value,
};
pub use skiff_eval::Interpreter;
pub use skiff_reader::{read_all, read_one};
