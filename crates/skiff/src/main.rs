use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use skiff_core::Value;
use skiff_eval::Interpreter;

#[derive(Parser)]
#[command(name = "skiff", about = "Skiff: a small embeddable Scheme")]
struct Cli {
    /// File to execute
    file: Option<String>,

    /// Evaluate an expression
    #[arg(short, long)]
    eval: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let interpreter = Interpreter::new();

    if let Some(expr) = &cli.eval {
        match interpreter.eval_str("<eval>", expr) {
            Ok(val) => {
                if !matches!(val, Value::Unspecified) {
                    println!("{val}");
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if let Some(file) = &cli.file {
        match std::fs::read_to_string(file) {
            Ok(content) => {
                if let Err(e) = interpreter.eval_str(file, &content) {
                    eprintln!("Error in {file}: {e}");
                    std::process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("Error reading {file}: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    repl(interpreter);
}

/// Interactive loop. Errors are printed and the loop keeps accepting
/// input; definitions persist between lines.
fn repl(interpreter: Interpreter) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Error: failed to create line editor: {e}");
            std::process::exit(1);
        }
    };

    println!("Skiff v{}", env!("CARGO_PKG_VERSION"));
    println!("Type ,quit to exit\n");

    let mut buffer = String::new();
    let mut in_multiline = false;

    loop {
        let prompt = if in_multiline { "  ... " } else { "skiff> " };
        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if !in_multiline && matches!(trimmed, ",quit" | ",exit" | ",q") {
                    break;
                }

                if in_multiline {
                    buffer.push('\n');
                    buffer.push_str(&line);
                } else {
                    buffer = line.clone();
                }

                if !is_balanced(&buffer) {
                    in_multiline = true;
                    continue;
                }

                in_multiline = false;
                let input = buffer.trim().to_string();
                buffer.clear();

                if input.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&input);

                match interpreter.eval_str("<repl>", &input) {
                    Ok(val) => {
                        if !matches!(val, Value::Unspecified) {
                            println!("{val}");
                        }
                    }
                    Err(e) => {
                        eprintln!("Error: {e}");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                if in_multiline {
                    buffer.clear();
                    in_multiline = false;
                    println!("^C");
                    continue;
                }
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }
}

fn is_balanced(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    for ch in input.chars() {
        if escape {
            escape = false;
            continue;
        }
        if ch == '\\' && in_string {
            escape = true;
            continue;
        }
        if ch == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0 && !in_string
}
