use skiff_core::list::{each_element, is_list, list_from, list_length};
use skiff_core::{Env, SkiffError, Value};

use crate::register_fn;

/// Advance `k` cdr steps into `list`. Shared by `list-tail` and `list-ref`;
/// the two differ only in how they treat landing on the empty list.
fn tail_at(name: &str, list: &Value, k_value: &Value) -> Result<(i64, Value), SkiffError> {
    let k = match k_value.as_number().and_then(|n| n.as_int()) {
        Some(k) if k >= 0 => k,
        _ => return Err(SkiffError::type_error_with_value("exact nonnegative integer", k_value)),
    };
    let mut cell = list.clone();
    for _ in 0..k {
        match cell {
            Value::Pair(p) => cell = p.cdr(),
            Value::Null => {
                return Err(SkiffError::OutOfRange {
                    name: name.to_string(),
                    index: k,
                    list: list.to_string(),
                });
            }
            _ => return Err(SkiffError::InvalidList),
        }
    }
    Ok((k, cell))
}

pub fn register(env: &Env) {
    register_fn(env, "pair?", &["obj"], |_ctx, args| {
        Ok(Value::bool(matches!(args[0], Value::Pair(_))))
    });

    register_fn(env, "cons", &["obj1", "obj2"], |_ctx, args| {
        Ok(Value::cons(args[0].clone(), args[1].clone()))
    });

    register_fn(env, "car", &["pair"], |_ctx, args| {
        match args[0].as_pair() {
            Some(pair) => Ok(pair.car()),
            None => Err(SkiffError::type_error_with_value("pair", &args[0])),
        }
    });

    register_fn(env, "cdr", &["pair"], |_ctx, args| {
        match args[0].as_pair() {
            Some(pair) => Ok(pair.cdr()),
            None => Err(SkiffError::type_error_with_value("pair", &args[0])),
        }
    });

    register_fn(env, "set-car!", &["pair", "obj"], |_ctx, args| {
        match args[0].as_pair() {
            Some(pair) => {
                pair.set_car(args[1].clone());
                Ok(Value::Unspecified)
            }
            None => Err(SkiffError::type_error_with_value("pair", &args[0])),
        }
    });

    register_fn(env, "set-cdr!", &["pair", "obj"], |_ctx, args| {
        match args[0].as_pair() {
            Some(pair) => {
                pair.set_cdr(args[1].clone());
                Ok(Value::Unspecified)
            }
            None => Err(SkiffError::type_error_with_value("pair", &args[0])),
        }
    });

    register_fn(env, "null?", &["obj"], |_ctx, args| {
        Ok(Value::bool(matches!(args[0], Value::Null)))
    });

    register_fn(env, "list?", &["obj"], |_ctx, args| {
        Ok(Value::bool(is_list(&args[0])))
    });

    register_fn(env, "list", &["obj..."], |_ctx, args| Ok(list_from(args)));

    register_fn(env, "length", &["list"], |_ctx, args| {
        match list_length(&args[0]) {
            Ok(n) => Ok(Value::int(n as i64)),
            Err(_) => Err(SkiffError::type_error_with_value("list", &args[0])),
        }
    });

    register_fn(env, "reverse", &["list"], |_ctx, args| {
        let mut result = Value::Null;
        each_element(&args[0], |_, v| {
            result = Value::cons(v.clone(), result.clone());
            Ok(())
        })?;
        Ok(result)
    });

    register_fn(env, "append", &["list..."], |_ctx, args| {
        let Some((last, init)) = args.split_last() else {
            return Ok(Value::Null);
        };
        let mut items = Vec::new();
        for arg in init {
            each_element(arg, |_, v| {
                items.push(v.clone());
                Ok(())
            })?;
        }
        let mut result = last.clone();
        for item in items.into_iter().rev() {
            result = Value::cons(item, result);
        }
        Ok(result)
    });

    register_fn(env, "list-tail", &["list", "k"], |_ctx, args| {
        let (_, tail) = tail_at("list-tail", &args[0], &args[1])?;
        Ok(tail)
    });

    register_fn(env, "list-ref", &["list", "k"], |_ctx, args| {
        let (k, tail) = tail_at("list-ref", &args[0], &args[1])?;
        match tail {
            Value::Pair(pair) => Ok(pair.car()),
            Value::Null => Err(SkiffError::OutOfRange {
                name: "list-ref".to_string(),
                index: k,
                list: args[0].to_string(),
            }),
            _ => Err(SkiffError::InvalidList),
        }
    });
}
