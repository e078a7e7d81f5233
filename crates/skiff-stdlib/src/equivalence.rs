use skiff_core::{Env, Value};

use crate::register_fn;

pub fn register(env: &Env) {
    register_fn(env, "eq?", &["obj1", "obj2"], |_ctx, args| {
        Ok(Value::bool(args[0].eq(&args[1])))
    });

    // Identity plus value equality for numbers and characters; with this
    // value model the two coincide, so eqv? shares eq?'s definition.
    register_fn(env, "eqv?", &["obj1", "obj2"], |_ctx, args| {
        Ok(Value::bool(args[0].eq(&args[1])))
    });

    register_fn(env, "equal?", &["obj1", "obj2"], |_ctx, args| {
        Ok(Value::bool(args[0].equal(&args[1])))
    });
}
