// crates/conch-core/examples/calculator.rs
// Run with: cargo run --example calculator
//
// Four-function calculator REPL in the default keyed grammar:
//
//   >>> add|op1=3 op2=4
//   7
//   >>> divide|op1=8 op2=0
//   error: division by zero
//
// Switch the line `Dispatcher::new()` to
// `Dispatcher::with_grammar(Grammar::positional())?` and register the
// positional variants to get `add|3,4` instead.

use std::io::{self, BufRead, Write};

use anyhow::{Context, anyhow};
use indexmap::IndexMap;
use serde_json::{Value, json};

use conch_core::{Command, Dispatcher, RegisterResult};

fn int_arg(args: &IndexMap<String, String>, name: &str) -> anyhow::Result<i64> {
    args[name]
        .parse::<i64>()
        .with_context(|| format!("argument {name} is not an integer"))
}

fn register_operations(dispatcher: &mut Dispatcher) -> RegisterResult<()> {
    dispatcher.register(
        Command::new("add")
            .alias("plus")
            .required("op1")
            .required("op2")
            .keyed(|args| Ok(json!(int_arg(args, "op1")? + int_arg(args, "op2")?))),
    )?;

    dispatcher.register(
        Command::new("subtract")
            .alias("minus")
            .required("op1")
            .required("op2")
            .keyed(|args| Ok(json!(int_arg(args, "op1")? - int_arg(args, "op2")?))),
    )?;

    dispatcher.register(
        Command::new("multiply")
            .alias("mul")
            .required("op1")
            .required("op2")
            .keyed(|args| Ok(json!(int_arg(args, "op1")? * int_arg(args, "op2")?))),
    )?;

    dispatcher.register(
        Command::new("divide")
            .alias("div")
            .required("op1")
            .required("op2")
            .keyed(|args| {
                let numerator = int_arg(args, "op1")?;
                let denominator = int_arg(args, "op2")?;
                numerator
                    .checked_div(denominator)
                    .map(|quotient| json!(quotient))
                    .ok_or_else(|| anyhow!("division by zero"))
            }),
    )?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut dispatcher = Dispatcher::new();
    register_operations(&mut dispatcher)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    print!(">>> ");
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim() == "quit" {
            break;
        }

        if line.trim() == "history" {
            // Surface-level convenience: dump the session log as JSON lines.
            for entry in dispatcher.history() {
                println!("{}", serde_json::to_string(entry)?);
            }
        } else {
            match dispatcher.handle_line(&line) {
                // Null results are suppressed at the surface; the history
                // still records the invocation.
                Ok(Value::Null) => {}
                Ok(result) => println!("{result}"),
                Err(error) => eprintln!("error: {error}"),
            }
        }

        print!(">>> ");
        stdout.flush()?;
    }

    Ok(())
}
