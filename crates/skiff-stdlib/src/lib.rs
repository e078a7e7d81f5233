mod arithmetic;
mod comparison;
mod equivalence;
mod io;
mod list;
mod predicates;
mod string;

use std::rc::Rc;

use skiff_core::{intern, Env, EvalContext, NativeFn, SkiffError, Value};

/// Install every builtin into `env` as a constant binding. Called once at
/// interpreter startup; the registry is immutable afterwards.
pub fn register_stdlib(env: &Env) {
    arithmetic::register(env);
    comparison::register(env);
    equivalence::register(env);
    list::register(env);
    predicates::register(env);
    string::register(env);
    io::register(env);
}

fn register_fn(
    env: &Env,
    name: &str,
    formals: &'static [&'static str],
    f: impl Fn(&EvalContext, &[Value]) -> Result<Value, SkiffError> + 'static,
) {
    env.define_const(
        intern(name),
        Value::NativeFn(Rc::new(NativeFn::new(name, formals, f))),
    );
}
