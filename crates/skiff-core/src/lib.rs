pub mod context;
pub mod env;
pub mod error;
pub mod list;
pub mod number;
pub mod value;

pub use context::{EvalContext, MemoryWriter};
pub use env::Env;
pub use error::{SkiffError, Span};
pub use number::Number;
pub use value::{intern, resolve, with_resolved, Lambda, NativeFn, Pair, Spur, Value};
