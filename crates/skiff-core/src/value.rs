use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use lasso::Rodeo;
pub use lasso::Spur;

use crate::context::EvalContext;
use crate::env::Env;
use crate::error::{SkiffError, Span};
use crate::number::Number;

thread_local! {
    static INTERNER: RefCell<Rodeo> = RefCell::new(Rodeo::default());
}

/// Intern a string, returning a Spur key.
pub fn intern(s: &str) -> Spur {
    INTERNER.with(|r| r.borrow_mut().get_or_intern(s))
}

/// Resolve a Spur key back to a String.
pub fn resolve(spur: Spur) -> String {
    INTERNER.with(|r| r.borrow().resolve(&spur).to_string())
}

/// Resolve a Spur and call f with the &str, avoiding allocation.
pub fn with_resolved<F, R>(spur: Spur, f: F) -> R
where
    F: FnOnce(&str) -> R,
{
    INTERNER.with(|r| {
        let interner = r.borrow();
        f(interner.resolve(&spur))
    })
}

/// A native procedure callable from Skiff.
pub type NativeFnInner = dyn Fn(&EvalContext, &[Value]) -> Result<Value, SkiffError>;

/// A builtin registry entry: the invocation name, the declared formal
/// parameters, and the native function. A trailing formal ending in `...`
/// marks a variadic tail; the formals before it are required.
///
/// The evaluator validates arity against the declaration before invoking
/// `func`, so natives only type-check the values they receive.
pub struct NativeFn {
    pub name: String,
    pub formals: &'static [&'static str],
    pub func: Box<NativeFnInner>,
}

impl NativeFn {
    pub fn new(
        name: impl Into<String>,
        formals: &'static [&'static str],
        func: impl Fn(&EvalContext, &[Value]) -> Result<Value, SkiffError> + 'static,
    ) -> Self {
        NativeFn {
            name: name.into(),
            formals,
            func: Box::new(func),
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.formals.last().is_some_and(|f| f.ends_with("..."))
    }

    /// Number of required arguments: every formal before the variadic marker.
    pub fn min_args(&self) -> usize {
        if self.is_variadic() {
            self.formals.len() - 1
        } else {
            self.formals.len()
        }
    }

    pub fn check_arity(&self, got: usize) -> Result<(), SkiffError> {
        let min = self.min_args();
        if self.is_variadic() {
            if got < min {
                return Err(SkiffError::arity(&self.name, format!("{min}+"), got));
            }
        } else if got != min {
            return Err(SkiffError::arity(&self.name, min.to_string(), got));
        }
        Ok(())
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<builtin {}>", self.name)
    }
}

/// A user-defined procedure: formals, body, and the frame captured at
/// creation. The captured frame is fixed for the closure's lifetime.
#[derive(Debug, Clone)]
pub struct Lambda {
    pub params: Vec<Spur>,
    pub rest: Option<Spur>,
    pub body: Vec<Value>,
    pub env: Env,
    pub name: Option<Spur>,
}

/// A mutable cons cell. Two bindings may alias the same cell; mutation
/// through one is visible through the other. Cells created by the reader
/// carry the source span of the element they hold.
#[derive(Debug)]
pub struct Pair {
    car: RefCell<Value>,
    cdr: RefCell<Value>,
    span: Option<Span>,
}

impl Pair {
    pub fn new(car: Value, cdr: Value) -> Self {
        Pair {
            car: RefCell::new(car),
            cdr: RefCell::new(cdr),
            span: None,
        }
    }

    pub fn with_span(span: Span, car: Value, cdr: Value) -> Self {
        Pair {
            car: RefCell::new(car),
            cdr: RefCell::new(cdr),
            span: Some(span),
        }
    }

    pub fn car(&self) -> Value {
        self.car.borrow().clone()
    }

    pub fn cdr(&self) -> Value {
        self.cdr.borrow().clone()
    }

    pub fn set_car(&self, v: Value) {
        *self.car.borrow_mut() = v;
    }

    pub fn set_cdr(&self, v: Value) {
        *self.cdr.borrow_mut() = v;
    }

    /// The recorded source span; `None` means an undefined location.
    pub fn location(&self) -> Option<Span> {
        self.span
    }
}

/// Unlink the cdr chain iteratively: dropping a long list must not recurse
/// once per cell. Shared tails stop the walk (their own drop handles the
/// rest); cyclic chains keep their cells alive, per the engine contract.
impl Drop for Pair {
    fn drop(&mut self) {
        let mut cdr = self.cdr.replace(Value::Null);
        while let Value::Pair(pair) = cdr {
            match Rc::try_unwrap(pair) {
                Ok(next) => cdr = next.cdr.replace(Value::Null),
                Err(_) => break,
            }
        }
    }
}

/// The core Value type for all Skiff data.
#[derive(Debug, Clone)]
pub enum Value {
    /// The empty list. A distinguished non-pair value.
    Null,
    /// The result of operations whose value is not meaningful.
    Unspecified,
    Bool(bool),
    Number(Number),
    Char(char),
    Str(Rc<RefCell<String>>),
    Symbol(Spur),
    Pair(Rc<Pair>),
    Lambda(Rc<Lambda>),
    NativeFn(Rc<NativeFn>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Unspecified => "unspecified",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Pair(_) => "pair",
            Value::Lambda(_) => "procedure",
            Value::NativeFn(_) => "procedure",
        }
    }

    /// Everything except `#f` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn int(n: i64) -> Value {
        Value::Number(Number::Int(n))
    }

    pub fn float(f: f64) -> Value {
        Value::Number(Number::Float(f))
    }

    pub fn bool(b: bool) -> Value {
        Value::Bool(b)
    }

    pub fn char(c: char) -> Value {
        Value::Char(c)
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::Str(Rc::new(RefCell::new(s.into())))
    }

    pub fn symbol(s: &str) -> Value {
        Value::Symbol(intern(s))
    }

    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Pair(Rc::new(Pair::new(car, cdr)))
    }

    pub fn cons_at(span: Span, car: Value, cdr: Value) -> Value {
        Value::Pair(Rc::new(Pair::with_span(span, car, cdr)))
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<&Rc<Pair>> {
        match self {
            Value::Pair(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_symbol_spur(&self) -> Option<Spur> {
        match self {
            Value::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&Rc<RefCell<String>>> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Identity equality. True only when both values are the same storage
    /// location; for immutable interned atoms this coincides with value
    /// equality.
    pub fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Unspecified, Value::Unspecified) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b),
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFn(a), Value::NativeFn(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Structural equality: recurses through pairs and compares string
    /// contents. Values of different kinds are never equal. Traversal
    /// iterates along the cdr chain and does not detect cycles.
    pub fn equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Pair(a), Value::Pair(b)) => {
                let mut x = Rc::clone(a);
                let mut y = Rc::clone(b);
                loop {
                    if Rc::ptr_eq(&x, &y) {
                        return true;
                    }
                    if !x.car().equal(&y.car()) {
                        return false;
                    }
                    match (x.cdr(), y.cdr()) {
                        (Value::Pair(nx), Value::Pair(ny)) => {
                            x = nx;
                            y = ny;
                        }
                        (cx, cy) => return cx.equal(&cy),
                    }
                }
            }
            _ => self.eq(other),
        }
    }
}

/// Structural equality, so values compare conveniently in tests and
/// host code. Identity comparisons go through [`Value::eq`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            _ => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "()"),
            Value::Unspecified => write!(f, "#<unspecified>"),
            Value::Bool(true) => write!(f, "#t"),
            Value::Bool(false) => write!(f, "#f"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Char(c) => match c {
                ' ' => write!(f, "#\\space"),
                '\n' => write!(f, "#\\newline"),
                '\t' => write!(f, "#\\tab"),
                '\r' => write!(f, "#\\return"),
                '\0' => write!(f, "#\\nul"),
                _ => write!(f, "#\\{c}"),
            },
            Value::Str(s) => write_string_literal(f, &s.borrow()),
            Value::Symbol(s) => with_resolved(*s, |name| write!(f, "{name}")),
            // Iterative over the cdr chain: a long proper list must not
            // recurse once per element.
            Value::Pair(pair) => {
                write!(f, "(")?;
                let mut cell = Rc::clone(pair);
                let mut first = true;
                loop {
                    if !first {
                        write!(f, " ")?;
                    }
                    first = false;
                    write!(f, "{}", cell.car())?;
                    match cell.cdr() {
                        Value::Pair(next) => cell = next,
                        Value::Null => break,
                        other => {
                            write!(f, " . {other}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Value::Lambda(l) => {
                if let Some(name) = l.name {
                    with_resolved(name, |n| write!(f, "#<lambda {n}>"))
                } else {
                    write!(f, "#<lambda>")
                }
            }
            Value::NativeFn(n) => write!(f, "#<builtin {}>", n.name),
        }
    }
}
