use skiff_core::{Env, Value};

use crate::register_fn;

pub fn register(env: &Env) {
    register_fn(env, "boolean?", &["obj"], |_ctx, args| {
        Ok(Value::bool(matches!(args[0], Value::Bool(_))))
    });

    register_fn(env, "number?", &["obj"], |_ctx, args| {
        Ok(Value::bool(matches!(args[0], Value::Number(_))))
    });

    register_fn(env, "string?", &["obj"], |_ctx, args| {
        Ok(Value::bool(matches!(args[0], Value::Str(_))))
    });

    register_fn(env, "symbol?", &["obj"], |_ctx, args| {
        Ok(Value::bool(matches!(args[0], Value::Symbol(_))))
    });

    register_fn(env, "char?", &["obj"], |_ctx, args| {
        Ok(Value::bool(matches!(args[0], Value::Char(_))))
    });

    register_fn(env, "procedure?", &["obj"], |_ctx, args| {
        Ok(Value::bool(matches!(
            args[0],
            Value::Lambda(_) | Value::NativeFn(_)
        )))
    });
}
