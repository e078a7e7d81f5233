use std::io::{Read, Write};
use std::rc::Rc;

use skiff_core::list::{each_element, list_from};
use skiff_core::{resolve, Env, EvalContext, Lambda, SkiffError, Value};

use crate::special_forms;

/// Trampoline for tail-call optimization: a finished value, or the next
/// expression/environment to evaluate in the caller's loop.
pub enum Trampoline {
    Value(Value),
    Eval(Value, Env),
}

pub type EvalResult = Result<Value, SkiffError>;

/// The interpreter owns the global frame (builtins as constant bindings,
/// user definitions alongside them) and the evaluation context with the
/// output sink. Top-level `define` targets this frame, so redefining a
/// builtin reports the constant-binding error rather than shadowing it.
pub struct Interpreter {
    global_env: Env,
    ctx: EvalContext,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_context(EvalContext::new())
    }

    /// Interpreter whose printing builtins write to `out` instead of
    /// standard output.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self::with_context(EvalContext::with_output(out))
    }

    fn with_context(ctx: EvalContext) -> Self {
        let global_env = Env::new();
        skiff_stdlib::register_stdlib(&global_env);
        Interpreter { global_env, ctx }
    }

    /// Parse and evaluate every top-level form from a character stream.
    /// `source` is the logical source name used in diagnostics. Returns the
    /// value of the last form, or the unspecified value for empty input.
    pub fn eval(&self, source: &str, input: &mut dyn Read) -> EvalResult {
        let mut text = String::new();
        input
            .read_to_string(&mut text)
            .map_err(|e| SkiffError::Io(e.to_string()))?;
        self.eval_str(source, &text)
    }

    pub fn eval_str(&self, source: &str, input: &str) -> EvalResult {
        let forms = skiff_reader::read_all(source, input)?;
        let mut result = Value::Unspecified;
        for form in &forms {
            result = eval_value(&self.ctx, form, &self.global_env)?;
        }
        Ok(result)
    }

    pub fn context(&self) -> &EvalContext {
        &self.ctx
    }

    /// The global frame: builtin registry plus top-level definitions.
    pub fn env(&self) -> &Env {
        &self.global_env
    }
}

/// Evaluate one expression to completion, looping on the trampoline so
/// chains of tail calls run in constant stack.
pub fn eval_value(ctx: &EvalContext, expr: &Value, env: &Env) -> EvalResult {
    let mut current_expr = expr.clone();
    let mut current_env = env.clone();
    loop {
        match eval_step(ctx, &current_expr, &current_env)? {
            Trampoline::Value(v) => return Ok(v),
            Trampoline::Eval(next_expr, next_env) => {
                current_expr = next_expr;
                current_env = next_env;
            }
        }
    }
}

fn eval_step(ctx: &EvalContext, expr: &Value, env: &Env) -> Result<Trampoline, SkiffError> {
    match expr {
        Value::Symbol(name) => env
            .get(*name)
            .map(Trampoline::Value)
            .ok_or_else(|| SkiffError::Unbound(resolve(*name))),

        Value::Pair(pair) => {
            let head = pair.car();

            if let Value::Symbol(name) = &head {
                if let Some(result) = special_forms::try_eval_special(ctx, *name, &pair.cdr(), env)
                {
                    return result;
                }
            }

            let func = eval_value(ctx, &head, env)?;

            // Operands left-to-right; traversing the argument chain tags a
            // failing operand's error with that operand's source span.
            let mut args = Vec::new();
            each_element(&pair.cdr(), |_, arg| {
                args.push(eval_value(ctx, arg, env)?);
                Ok(())
            })?;

            apply(ctx, &func, args)
        }

        // Everything else is self-evaluating.
        _ => Ok(Trampoline::Value(expr.clone())),
    }
}

/// Apply a procedure to already-evaluated arguments. Natives are validated
/// against their declared formals and invoked directly; lambdas enter the
/// trampoline with their final body expression in tail position.
pub fn apply(ctx: &EvalContext, func: &Value, args: Vec<Value>) -> Result<Trampoline, SkiffError> {
    match func {
        Value::NativeFn(native) => {
            native.check_arity(args.len())?;
            Ok(Trampoline::Value((native.func)(ctx, &args)?))
        }
        Value::Lambda(lambda) => apply_lambda(ctx, lambda, args),
        other => Err(SkiffError::type_error_with_value("procedure", other)),
    }
}

fn lambda_name(lambda: &Lambda) -> String {
    lambda
        .name
        .map(resolve)
        .unwrap_or_else(|| "lambda".to_string())
}

fn apply_lambda(
    ctx: &EvalContext,
    lambda: &Rc<Lambda>,
    args: Vec<Value>,
) -> Result<Trampoline, SkiffError> {
    if lambda.rest.is_some() {
        if args.len() < lambda.params.len() {
            return Err(SkiffError::arity(
                lambda_name(lambda),
                format!("{}+", lambda.params.len()),
                args.len(),
            ));
        }
    } else if args.len() != lambda.params.len() {
        return Err(SkiffError::arity(
            lambda_name(lambda),
            lambda.params.len().to_string(),
            args.len(),
        ));
    }

    // The new frame is a child of the closure's captured frame, not the
    // caller's: this is what makes the closure lexically scoped.
    let new_env = Env::with_parent(Rc::new(lambda.env.clone()));
    for (param, arg) in lambda.params.iter().zip(args.iter()) {
        new_env.define(*param, arg.clone())?;
    }
    if let Some(rest) = lambda.rest {
        new_env.define(rest, list_from(&args[lambda.params.len()..]))?;
    }

    match lambda.body.split_last() {
        None => Ok(Trampoline::Value(Value::Unspecified)),
        Some((last, init)) => {
            for expr in init {
                eval_value(ctx, expr, &new_env)?;
            }
            Ok(Trampoline::Eval(last.clone(), new_env))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str) -> Value {
        Interpreter::new()
            .eval_str("test", input)
            .unwrap_or_else(|e| panic!("eval failed for {input}: {e}"))
    }

    fn eval_err(input: &str) -> SkiffError {
        Interpreter::new()
            .eval_str("test", input)
            .expect_err(&format!("expected failure for {input}"))
    }

    #[test]
    fn self_evaluating_atoms() {
        assert_eq!(eval("42"), Value::int(42));
        assert_eq!(eval("#t"), Value::bool(true));
        assert_eq!(eval("\"hi\""), Value::string("hi"));
        assert_eq!(eval("#\\a"), Value::char('a'));
    }

    #[test]
    fn symbol_lookup_and_unbound() {
        assert_eq!(eval("(define x 7) x"), Value::int(7));
        let err = eval_err("nonesuch");
        assert!(matches!(err.inner(), SkiffError::Unbound(name) if name == "nonesuch"));
    }

    #[test]
    fn application_evaluates_operands_left_to_right() {
        assert_eq!(
            eval("(define order (list)) (define (note n) (set! order (cons n order)) n) (+ (note 1) (note 2) (note 3)) (reverse order)")
                .to_string(),
            "(1 2 3)"
        );
    }

    #[test]
    fn native_arity_is_validated_centrally() {
        let err = eval_err("(cons 1)");
        assert!(matches!(
            err.inner(),
            SkiffError::Arity { name, got: 1, .. } if name == "cons"
        ));
        let err = eval_err("(cons 1 2 3)");
        assert!(matches!(err.inner(), SkiffError::Arity { got: 3, .. }));
    }

    #[test]
    fn lambda_arity_both_directions() {
        assert!(matches!(
            eval_err("((lambda (a b) a) 1)").inner(),
            SkiffError::Arity { got: 1, .. }
        ));
        assert!(matches!(
            eval_err("((lambda (a b) a) 1 2 3)").inner(),
            SkiffError::Arity { got: 3, .. }
        ));
    }

    #[test]
    fn variadic_lambda_collects_rest() {
        assert_eq!(eval("((lambda (a . rest) rest) 1 2 3)").to_string(), "(2 3)");
        assert_eq!(eval("((lambda args args) 1 2)").to_string(), "(1 2)");
        assert_eq!(eval("((lambda (a . rest) rest) 1)"), Value::Null);
        assert!(matches!(
            eval_err("((lambda (a . rest) rest))").inner(),
            SkiffError::Arity { .. }
        ));
    }

    #[test]
    fn applying_a_non_procedure_fails() {
        let err = eval_err("(1 2 3)");
        assert!(matches!(err.inner(), SkiffError::Type { expected, .. } if expected == "procedure"));
    }

    #[test]
    fn closures_capture_defining_frame() {
        assert_eq!(
            eval("(define (make-adder n) (lambda (x) (+ x n))) \
                  (define add2 (make-adder 2)) \
                  (define n 100) \
                  (add2 40)"),
            Value::int(42)
        );
    }

    #[test]
    fn tail_recursion_runs_in_constant_stack() {
        assert_eq!(
            eval("(define (count n) (if (= n 0) 0 (count (- n 1)))) (count 200000)"),
            Value::int(0)
        );
    }

    #[test]
    fn mutual_tail_recursion() {
        assert_eq!(
            eval("(define (even? n) (if (= n 0) #t (odd? (- n 1)))) \
                  (define (odd? n) (if (= n 0) #f (even? (- n 1)))) \
                  (even? 100001)"),
            Value::bool(false)
        );
    }

    #[test]
    fn definitions_persist_across_eval_calls() {
        let interp = Interpreter::new();
        interp.eval_str("test", "(define x 5)").unwrap();
        assert_eq!(interp.eval_str("test", "x").unwrap(), Value::int(5));
    }

    #[test]
    fn empty_input_yields_unspecified() {
        assert_eq!(eval(""), Value::Unspecified);
        assert_eq!(eval("; just a comment"), Value::Unspecified);
    }

    #[test]
    fn failing_operand_reports_its_location() {
        let err = eval_err("(+ 1\n   ghost)");
        assert_eq!(err.to_string(), "test:2:4: unbound symbol: ghost");
    }

    #[test]
    fn builtins_cannot_be_assigned_or_redefined() {
        assert!(matches!(
            eval_err("(set! car 1)").inner(),
            SkiffError::Constant(name) if name == "car"
        ));
        assert!(matches!(
            eval_err("(define car 1)").inner(),
            SkiffError::Constant(name) if name == "car"
        ));
    }

    #[test]
    fn builtins_can_be_shadowed_locally() {
        assert_eq!(eval("((lambda (car) car) 9)"), Value::int(9));
        assert_eq!(eval("(let ((list 1)) list)"), Value::int(1));
    }
}
