use skiff::{Interpreter, MemoryWriter, SkiffError, Value};

fn eval(input: &str) -> Value {
    Interpreter::new()
        .eval_str("test", input)
        .unwrap_or_else(|e| panic!("eval failed for {input}: {e}"))
}

fn eval_to_string(input: &str) -> String {
    eval(input).to_string()
}

fn eval_err(input: &str) -> SkiffError {
    Interpreter::new()
        .eval_str("test", input)
        .expect_err(&format!("expected failure for {input}"))
}

#[test]
fn test_arithmetic() {
    assert_eq!(eval("(+ 1 2)"), Value::int(3));
    assert_eq!(eval("(- 10 3)"), Value::int(7));
    assert_eq!(eval("(- 5)"), Value::int(-5));
    assert_eq!(eval("(* 4 5)"), Value::int(20));
    assert_eq!(eval("(/ 10 2)"), Value::int(5));
    assert_eq!(eval("(/ 10 4)"), Value::float(2.5));
    assert_eq!(eval("(+ 1 2.0)"), Value::float(3.0));
    assert_eq!(eval("(- 1 2 3)"), Value::int(-4));
}

#[test]
fn test_division_by_zero() {
    assert!(eval_err("(/ 1 0)").to_string().contains("division by zero"));
}

#[test]
fn test_comparison() {
    assert_eq!(eval("(< 1 2)"), Value::bool(true));
    assert_eq!(eval("(> 3 2)"), Value::bool(true));
    assert_eq!(eval("(<= 2 2)"), Value::bool(true));
    assert_eq!(eval("(>= 1 2)"), Value::bool(false));
    assert_eq!(eval("(= 42 42)"), Value::bool(true));
    assert_eq!(eval("(= 1 1.0)"), Value::bool(true));
    assert_eq!(eval("(< 1 2 3)"), Value::bool(true));
    assert_eq!(eval("(< 1 3 2)"), Value::bool(false));
    assert_eq!(eval("(not #f)"), Value::bool(true));
    assert_eq!(eval("(not 1)"), Value::bool(false));
}

#[test]
fn test_define_and_call() {
    assert_eq!(eval("(define x 42) x"), Value::int(42));
    assert_eq!(eval("(define (square x) (* x x)) (square 5)"), Value::int(25));
}

#[test]
fn test_factorial() {
    assert_eq!(
        eval("(define (factorial n) (if (<= n 1) 1 (* n (factorial (- n 1))))) (factorial 10)"),
        Value::int(3628800)
    );
}

#[test]
fn test_lambda() {
    assert_eq!(eval("((lambda (x y) (+ x y)) 3 4)"), Value::int(7));
    assert_eq!(eval_to_string("((lambda args args) 1 2 3)"), "(1 2 3)");
}

#[test]
fn test_let() {
    assert_eq!(eval("(let ((x 10) (y 20)) (+ x y))"), Value::int(30));
}

#[test]
fn test_cond() {
    assert_eq!(
        eval("(cond ((= 1 2) 10) ((= 1 1) 20) (else 30))"),
        Value::int(20)
    );
}

#[test]
fn test_and_or() {
    assert_eq!(eval("(and 1 2 3)"), Value::int(3));
    assert_eq!(eval("(and 1 #f 3)"), Value::bool(false));
    assert_eq!(eval("(or #f #f 3)"), Value::int(3));
    assert_eq!(eval("(or 1 2 3)"), Value::int(1));
}

#[test]
fn test_list_operations() {
    assert_eq!(eval("(car (list 1 2 3))"), Value::int(1));
    assert_eq!(eval_to_string("(cdr (list 1 2 3))"), "(2 3)");
    assert_eq!(eval_to_string("(cons 0 (list 1 2))"), "(0 1 2)");
    assert_eq!(eval("(length (list 1 2 3))"), Value::int(3));
    assert_eq!(eval_to_string("(reverse (list 1 2 3))"), "(3 2 1)");
    assert_eq!(
        eval_to_string("(append (list 1 2) (list 3 4))"),
        "(1 2 3 4)"
    );
    assert_eq!(eval_to_string("(append)"), "()");
    assert_eq!(eval_to_string("(append (list 1) 2)"), "(1 . 2)");
}

#[test]
fn test_shared_structure_mutation() {
    // Mutating through one name is visible through the other, and through
    // any list that contains the same cell.
    assert_eq!(
        eval_to_string(
            "(define cell (cons 1 2))
             (define holder (list cell cell))
             (set-car! cell 99)
             holder"
        ),
        "((99 . 2) (99 . 2))"
    );
}

#[test]
fn test_equivalence() {
    assert_eq!(eval("(eq? 'a 'a)"), Value::bool(true));
    assert_eq!(eval("(eq? (cons 1 2) (cons 1 2))"), Value::bool(false));
    assert_eq!(eval("(define v (cons 1 2)) (eq? v v)"), Value::bool(true));
    assert_eq!(eval("(equal? (cons 1 2) (cons 1 2))"), Value::bool(true));
    assert_eq!(eval("(equal? (list 1 2 3) (list 1 2 3))"), Value::bool(true));
    assert_eq!(eval("(equal? (list 1 2) (list 1 2 3))"), Value::bool(false));
    assert_eq!(eval("(equal? 1 \"1\")"), Value::bool(false));
    assert_eq!(eval("(eqv? 1 1)"), Value::bool(true));
    assert_eq!(eval("(eqv? 1 1.0)"), Value::bool(false));
    assert_eq!(eval("(equal? \"ab\" \"ab\")"), Value::bool(true));
    assert_eq!(eval("(eq? \"ab\" \"ab\")"), Value::bool(false));
}

#[test]
fn test_predicates() {
    assert_eq!(eval("(boolean? #t)"), Value::bool(true));
    assert_eq!(eval("(number? 1.5)"), Value::bool(true));
    assert_eq!(eval("(string? \"s\")"), Value::bool(true));
    assert_eq!(eval("(symbol? 'a)"), Value::bool(true));
    assert_eq!(eval("(char? #\\a)"), Value::bool(true));
    assert_eq!(eval("(procedure? car)"), Value::bool(true));
    assert_eq!(eval("(procedure? (lambda (x) x))"), Value::bool(true));
    assert_eq!(eval("(procedure? 'car)"), Value::bool(false));
}

#[test]
fn test_strings() {
    assert_eq!(eval("(string-length \"hello\")"), Value::int(5));
    assert_eq!(eval("(string-length \"\")"), Value::int(0));
    assert_eq!(eval("(string-append \"foo\" \"bar\")"), Value::string("foobar"));
    assert_eq!(eval("(symbol->string 'abc)"), Value::string("abc"));
}

#[test]
fn test_quote() {
    assert_eq!(eval_to_string("'(1 2 3)"), "(1 2 3)");
    assert_eq!(eval_to_string("(quote (a . b))"), "(a . b)");
    assert_eq!(eval("'x"), Value::symbol("x"));
}

#[test]
fn test_output_capture() {
    let out = MemoryWriter::new();
    let interp = Interpreter::with_output(Box::new(out.clone()));
    interp
        .eval_str("test", "(display \"x = \") (write \"x\") (newline)")
        .unwrap();
    assert_eq!(out.contents(), "x = \"x\"\n");
}

#[test]
fn test_error_reporting() {
    assert!(matches!(
        eval_err("ghost").inner(),
        SkiffError::Unbound(name) if name == "ghost"
    ));
    assert!(matches!(
        eval_err("(set! ghost 1)").inner(),
        SkiffError::AssignUnbound(_)
    ));
    assert!(matches!(
        eval_err("(define car 1)").inner(),
        SkiffError::Constant(_)
    ));
    assert!(matches!(
        eval_err("(string-length 3)").inner(),
        SkiffError::Type { .. }
    ));
    assert!(matches!(
        eval_err("(newline 1)").inner(),
        SkiffError::Arity { .. }
    ));
}

#[test]
fn test_interpreter_survives_errors() {
    // The host can display an error and keep going; state is unaffected.
    let interp = Interpreter::new();
    interp.eval_str("test", "(define x 1)").unwrap();
    assert!(interp.eval_str("test", "(car x)").is_err());
    assert_eq!(interp.eval_str("test", "x").unwrap(), Value::int(1));
}

#[test]
fn test_render_parse_agreement() {
    for text in ["(1 2)", "(1 2 3)", "#t", "#f", "42", "2.5", "\"hi\"", "()"] {
        let rendered = skiff::read_one("test", text).unwrap().to_string();
        assert_eq!(
            skiff::read_one("test", &rendered).unwrap().to_string(),
            rendered,
            "round-trip for {text}"
        );
    }
}

#[test]
fn test_deep_tail_recursion() {
    assert_eq!(
        eval("(define (loop n acc) (if (= n 0) acc (loop (- n 1) (+ acc 1)))) (loop 500000 0)"),
        Value::int(500000)
    );
}
