use skiff_core::{Env, SkiffError, Value};

use crate::register_fn;

pub fn register(env: &Env) {
    register_fn(env, "string-length", &["string"], |_ctx, args| {
        match args[0].as_str() {
            Some(s) => Ok(Value::int(s.borrow().chars().count() as i64)),
            None => Err(SkiffError::type_error_with_value("string", &args[0])),
        }
    });

    register_fn(env, "string-append", &["string..."], |_ctx, args| {
        let mut out = String::new();
        for arg in args {
            match arg.as_str() {
                Some(s) => out.push_str(&s.borrow()),
                None => return Err(SkiffError::type_error_with_value("string", arg)),
            }
        }
        Ok(Value::string(out))
    });

    register_fn(env, "symbol->string", &["symbol"], |_ctx, args| {
        match args[0].as_symbol_spur() {
            Some(spur) => Ok(Value::string(skiff_core::resolve(spur))),
            None => Err(SkiffError::type_error_with_value("symbol", &args[0])),
        }
    });
}
