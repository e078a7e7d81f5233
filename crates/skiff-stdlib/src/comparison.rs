use std::cmp::Ordering;

use skiff_core::{Env, Number, SkiffError, Value};

use crate::register_fn;

fn as_number(v: &Value) -> Result<Number, SkiffError> {
    v.as_number()
        .ok_or_else(|| SkiffError::type_error_with_value("number", v))
}

/// Chained numeric comparison: true when every adjacent operand pair
/// satisfies the predicate.
fn chain(
    args: &[Value],
    ok: impl Fn(Option<Ordering>) -> bool,
) -> Result<Value, SkiffError> {
    let mut prev = as_number(&args[0])?;
    for arg in &args[1..] {
        let next = as_number(arg)?;
        if !ok(prev.partial_cmp(&next)) {
            return Ok(Value::bool(false));
        }
        prev = next;
    }
    Ok(Value::bool(true))
}

pub fn register(env: &Env) {
    register_fn(env, "=", &["z1", "z2", "z..."], |_ctx, args| {
        chain(args, |ord| ord == Some(Ordering::Equal))
    });

    register_fn(env, "<", &["z1", "z2", "z..."], |_ctx, args| {
        chain(args, |ord| ord == Some(Ordering::Less))
    });

    register_fn(env, ">", &["z1", "z2", "z..."], |_ctx, args| {
        chain(args, |ord| ord == Some(Ordering::Greater))
    });

    register_fn(env, "<=", &["z1", "z2", "z..."], |_ctx, args| {
        chain(args, |ord| {
            matches!(ord, Some(Ordering::Less | Ordering::Equal))
        })
    });

    register_fn(env, ">=", &["z1", "z2", "z..."], |_ctx, args| {
        chain(args, |ord| {
            matches!(ord, Some(Ordering::Greater | Ordering::Equal))
        })
    });

    register_fn(env, "not", &["obj"], |_ctx, args| {
        Ok(Value::bool(!args[0].is_truthy()))
    });
}
