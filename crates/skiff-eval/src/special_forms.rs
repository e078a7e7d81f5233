use std::cell::Cell;
use std::rc::Rc;

use skiff_core::list::list_to_vec;
use skiff_core::{intern, Env, EvalContext, Lambda, SkiffError, Spur, Value};

use crate::eval::{self, Trampoline};

/// Pre-interned `Spur` handles for the special form names. Every list
/// expression checks its head against these, so the dispatch compares
/// interner keys instead of resolving strings.
struct SpecialFormSpurs {
    and: Spur,
    begin: Spur,
    cond: Spur,
    define: Spur,
    else_: Spur,
    if_: Spur,
    lambda: Spur,
    let_: Spur,
    or: Spur,
    quote: Spur,
    set_bang: Spur,
}

impl SpecialFormSpurs {
    fn init() -> Self {
        Self {
            and: intern("and"),
            begin: intern("begin"),
            cond: intern("cond"),
            define: intern("define"),
            else_: intern("else"),
            if_: intern("if"),
            lambda: intern("lambda"),
            let_: intern("let"),
            or: intern("or"),
            quote: intern("quote"),
            set_bang: intern("set!"),
        }
    }
}

thread_local! {
    static SF: Cell<Option<&'static SpecialFormSpurs>> = const { Cell::new(None) };
}

fn special_forms() -> &'static SpecialFormSpurs {
    SF.with(|cell| match cell.get() {
        Some(sf) => sf,
        None => {
            let sf: &'static SpecialFormSpurs = Box::leak(Box::new(SpecialFormSpurs::init()));
            cell.set(Some(sf));
            sf
        }
    })
}

/// Evaluate a special form. Returns Some(result) if the head names a
/// special form, None if the expression is an ordinary application.
pub fn try_eval_special(
    ctx: &EvalContext,
    head: Spur,
    args: &Value,
    env: &Env,
) -> Option<Result<Trampoline, SkiffError>> {
    let sf = special_forms();

    if head == sf.if_ {
        Some(eval_if(ctx, args, env))
    } else if head == sf.define {
        Some(eval_define(ctx, args, env))
    } else if head == sf.lambda {
        Some(eval_lambda(args, env))
    } else if head == sf.begin {
        Some(eval_begin(ctx, args, env))
    } else if head == sf.set_bang {
        Some(eval_set(ctx, args, env))
    } else if head == sf.quote {
        Some(eval_quote(args))
    } else if head == sf.let_ {
        Some(eval_let(ctx, args, env))
    } else if head == sf.cond {
        Some(eval_cond(ctx, args, env))
    } else if head == sf.and {
        Some(eval_and(ctx, args, env))
    } else if head == sf.or {
        Some(eval_or(ctx, args, env))
    } else {
        None
    }
}

fn eval_quote(args: &Value) -> Result<Trampoline, SkiffError> {
    let items = list_to_vec(args)?;
    if items.len() != 1 {
        return Err(SkiffError::arity("quote", "1", items.len()));
    }
    Ok(Trampoline::Value(items[0].clone()))
}

fn eval_if(ctx: &EvalContext, args: &Value, env: &Env) -> Result<Trampoline, SkiffError> {
    let items = list_to_vec(args)?;
    if items.len() < 2 || items.len() > 3 {
        return Err(SkiffError::arity("if", "2 or 3", items.len()));
    }
    let test = eval::eval_value(ctx, &items[0], env)?;
    if test.is_truthy() {
        Ok(Trampoline::Eval(items[1].clone(), env.clone()))
    } else if items.len() == 3 {
        Ok(Trampoline::Eval(items[2].clone(), env.clone()))
    } else {
        Ok(Trampoline::Value(Value::Unspecified))
    }
}

fn eval_define(ctx: &EvalContext, args: &Value, env: &Env) -> Result<Trampoline, SkiffError> {
    let items = list_to_vec(args)?;
    if items.is_empty() {
        return Err(SkiffError::arity("define", "2", 0));
    }
    match &items[0] {
        // (define name expr)
        Value::Symbol(name) => {
            if items.len() != 2 {
                return Err(SkiffError::arity("define", "2", items.len()));
            }
            let value = eval::eval_value(ctx, &items[1], env)?;
            env.define(*name, value)?;
            Ok(Trampoline::Value(Value::Unspecified))
        }
        // (define (name . formals) body...)
        Value::Pair(signature) => {
            let name = signature
                .car()
                .as_symbol_spur()
                .ok_or_else(|| SkiffError::eval("define: procedure name must be a symbol"))?;
            if items.len() < 2 {
                return Err(SkiffError::eval("define: procedure body cannot be empty"));
            }
            let (params, rest) = parse_formals(&signature.cdr())?;
            let lambda = Value::Lambda(Rc::new(Lambda {
                params,
                rest,
                body: items[1..].to_vec(),
                env: env.clone(),
                name: Some(name),
            }));
            env.define(name, lambda)?;
            Ok(Trampoline::Value(Value::Unspecified))
        }
        other => Err(SkiffError::type_error_with_value("symbol or list", other)),
    }
}

fn eval_set(ctx: &EvalContext, args: &Value, env: &Env) -> Result<Trampoline, SkiffError> {
    let items = list_to_vec(args)?;
    if items.len() != 2 {
        return Err(SkiffError::arity("set!", "2", items.len()));
    }
    let name = items[0]
        .as_symbol_spur()
        .ok_or_else(|| SkiffError::eval("set!: first argument must be a symbol"))?;
    let value = eval::eval_value(ctx, &items[1], env)?;
    env.assign(name, value)?;
    Ok(Trampoline::Value(Value::Unspecified))
}

fn eval_begin(ctx: &EvalContext, args: &Value, env: &Env) -> Result<Trampoline, SkiffError> {
    let items = list_to_vec(args)?;
    match items.split_last() {
        None => Ok(Trampoline::Value(Value::Unspecified)),
        Some((last, init)) => {
            for expr in init {
                eval::eval_value(ctx, expr, env)?;
            }
            Ok(Trampoline::Eval(last.clone(), env.clone()))
        }
    }
}

fn eval_lambda(args: &Value, env: &Env) -> Result<Trampoline, SkiffError> {
    let items = list_to_vec(args)?;
    if items.len() < 2 {
        return Err(SkiffError::arity("lambda", "2+", items.len()));
    }
    let (params, rest) = parse_formals(&items[0])?;
    Ok(Trampoline::Value(Value::Lambda(Rc::new(Lambda {
        params,
        rest,
        body: items[1..].to_vec(),
        env: env.clone(),
        name: None,
    }))))
}

/// Parse a formals list: a bare symbol binds the whole argument list, a
/// proper list binds fixed parameters, and a dotted tail symbol binds the
/// variadic remainder.
fn parse_formals(formals: &Value) -> Result<(Vec<Spur>, Option<Spur>), SkiffError> {
    if let Value::Symbol(rest) = formals {
        return Ok((Vec::new(), Some(*rest)));
    }
    let mut params = Vec::new();
    let mut cell = formals.clone();
    loop {
        match cell {
            Value::Null => return Ok((params, None)),
            Value::Symbol(rest) => return Ok((params, Some(rest))),
            Value::Pair(pair) => {
                let param = pair
                    .car()
                    .as_symbol_spur()
                    .ok_or_else(|| SkiffError::eval("lambda: parameter must be a symbol"))?;
                params.push(param);
                cell = pair.cdr();
            }
            other => {
                return Err(SkiffError::type_error_with_value("formals list", &other));
            }
        }
    }
}

fn eval_let(ctx: &EvalContext, args: &Value, env: &Env) -> Result<Trampoline, SkiffError> {
    let items = list_to_vec(args)?;
    if items.len() < 2 {
        return Err(SkiffError::arity("let", "2+", items.len()));
    }
    let bindings = list_to_vec(&items[0])
        .map_err(|_| SkiffError::eval("let: bindings must be a list"))?;

    // Initializers evaluate in the outer frame; the body sees them all at
    // once in a fresh child frame.
    let mut bound = Vec::with_capacity(bindings.len());
    for binding in &bindings {
        let pair = list_to_vec(binding)
            .map_err(|_| SkiffError::eval("let: each binding must be a (name init) list"))?;
        if pair.len() != 2 {
            return Err(SkiffError::eval("let: each binding must be a (name init) list"));
        }
        let name = pair[0]
            .as_symbol_spur()
            .ok_or_else(|| SkiffError::eval("let: binding name must be a symbol"))?;
        bound.push((name, eval::eval_value(ctx, &pair[1], env)?));
    }

    let new_env = Env::with_parent(Rc::new(env.clone()));
    for (name, value) in bound {
        new_env.define(name, value)?;
    }

    let body = &items[1..];
    for expr in &body[..body.len() - 1] {
        eval::eval_value(ctx, expr, &new_env)?;
    }
    Ok(Trampoline::Eval(body[body.len() - 1].clone(), new_env))
}

fn eval_cond(ctx: &EvalContext, args: &Value, env: &Env) -> Result<Trampoline, SkiffError> {
    let sf = special_forms();
    let clauses = list_to_vec(args)?;
    for clause in &clauses {
        let items = list_to_vec(clause)
            .map_err(|_| SkiffError::eval("cond: clause must be a list"))?;
        let Some((test, body)) = items.split_first() else {
            return Err(SkiffError::eval("cond: clause must not be empty"));
        };
        let is_else = test.as_symbol_spur() == Some(sf.else_);
        let test_value = if is_else {
            Value::Bool(true)
        } else {
            eval::eval_value(ctx, test, env)?
        };
        if test_value.is_truthy() {
            let Some((last, init)) = body.split_last() else {
                // Clause with no body yields the test's own value.
                return Ok(Trampoline::Value(test_value));
            };
            for expr in init {
                eval::eval_value(ctx, expr, env)?;
            }
            return Ok(Trampoline::Eval(last.clone(), env.clone()));
        }
    }
    Ok(Trampoline::Value(Value::Unspecified))
}

fn eval_and(ctx: &EvalContext, args: &Value, env: &Env) -> Result<Trampoline, SkiffError> {
    let items = list_to_vec(args)?;
    match items.split_last() {
        None => Ok(Trampoline::Value(Value::bool(true))),
        Some((last, init)) => {
            for expr in init {
                let value = eval::eval_value(ctx, expr, env)?;
                if !value.is_truthy() {
                    return Ok(Trampoline::Value(value));
                }
            }
            Ok(Trampoline::Eval(last.clone(), env.clone()))
        }
    }
}

fn eval_or(ctx: &EvalContext, args: &Value, env: &Env) -> Result<Trampoline, SkiffError> {
    let items = list_to_vec(args)?;
    match items.split_last() {
        None => Ok(Trampoline::Value(Value::bool(false))),
        Some((last, init)) => {
            for expr in init {
                let value = eval::eval_value(ctx, expr, env)?;
                if value.is_truthy() {
                    return Ok(Trampoline::Value(value));
                }
            }
            Ok(Trampoline::Eval(last.clone(), env.clone()))
        }
    }
}
