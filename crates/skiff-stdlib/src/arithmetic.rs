use skiff_core::{Env, Number, SkiffError, Value};

use crate::register_fn;

fn as_number(v: &Value) -> Result<Number, SkiffError> {
    v.as_number()
        .ok_or_else(|| SkiffError::type_error_with_value("number", v))
}

fn add(a: Number, b: Number) -> Number {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => Number::Int(x + y),
        _ => Number::Float(a.as_f64() + b.as_f64()),
    }
}

fn sub(a: Number, b: Number) -> Number {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => Number::Int(x - y),
        _ => Number::Float(a.as_f64() - b.as_f64()),
    }
}

fn mul(a: Number, b: Number) -> Number {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => Number::Int(x * y),
        _ => Number::Float(a.as_f64() * b.as_f64()),
    }
}

pub fn register(env: &Env) {
    register_fn(env, "+", &["z..."], |_ctx, args| {
        let mut acc = Number::Int(0);
        for arg in args {
            acc = add(acc, as_number(arg)?);
        }
        Ok(Value::Number(acc))
    });

    register_fn(env, "*", &["z..."], |_ctx, args| {
        let mut acc = Number::Int(1);
        for arg in args {
            acc = mul(acc, as_number(arg)?);
        }
        Ok(Value::Number(acc))
    });

    register_fn(env, "-", &["z", "z..."], |_ctx, args| {
        let first = as_number(&args[0])?;
        if args.len() == 1 {
            return Ok(Value::Number(sub(Number::Int(0), first)));
        }
        let mut acc = first;
        for arg in &args[1..] {
            acc = sub(acc, as_number(arg)?);
        }
        Ok(Value::Number(acc))
    });

    register_fn(env, "/", &["z", "z..."], |_ctx, args| {
        let first = as_number(&args[0])?;
        let mut acc = if args.len() == 1 { 1.0 } else { first.as_f64() };
        let divisors = if args.len() == 1 { &args[..] } else { &args[1..] };
        for arg in divisors {
            let divisor = as_number(arg)?.as_f64();
            if divisor == 0.0 {
                return Err(SkiffError::eval("division by zero"));
            }
            acc /= divisor;
        }
        // Exact result when every operand was exact and nothing was lost.
        if acc.fract() == 0.0 && args.iter().all(|a| matches!(a.as_number(), Some(n) if n.is_exact()))
        {
            Ok(Value::int(acc as i64))
        } else {
            Ok(Value::float(acc))
        }
    });
}
