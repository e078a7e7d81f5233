mod eval;
mod special_forms;

pub use eval::{apply, eval_value, EvalResult, Interpreter, Trampoline};
