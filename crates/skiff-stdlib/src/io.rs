use skiff_core::{Env, Value};

use crate::register_fn;

pub fn register(env: &Env) {
    // display prints strings raw; everything else uses the canonical form.
    register_fn(env, "display", &["obj"], |ctx, args| {
        match args[0].as_str() {
            Some(s) => ctx.write_str(&s.borrow())?,
            None => ctx.write_str(&args[0].to_string())?,
        }
        Ok(Value::Unspecified)
    });

    register_fn(env, "write", &["obj"], |ctx, args| {
        ctx.write_str(&args[0].to_string())?;
        Ok(Value::Unspecified)
    });

    register_fn(env, "newline", &[], |ctx, _args| {
        ctx.write_str("\n")?;
        Ok(Value::Unspecified)
    });
}
