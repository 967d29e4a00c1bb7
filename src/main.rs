use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use log::error;
use minisql::{ExecutionResult, MemoryBackend};

/// Interactive SQL shell over an in-memory table store
#[derive(Parser, Debug)]
#[command(name = "minisql", version, long_about = None)]
struct Config {
    /// Execute SQL and exit
    #[arg(short = 'c', long = "command")]
    command: Option<String>,

    /// Exit at the first failing statement instead of reporting it and going on
    #[arg(long, default_value_t = false)]
    halt_on_error: bool,

    /// Prompt printed before each input line
    #[arg(long, default_value = "# ")]
    prompt: String,

    /// Log filter (error, warn, info, debug, trace)
    #[arg(long, env = "MINISQL_LOG", default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let config = Config::parse();
    env_logger::Builder::new()
        .parse_filters(&config.log_level)
        .init();

    let mut backend = MemoryBackend::new();

    if let Some(sql) = &config.command {
        return if execute(&mut backend, sql) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    println!("Welcome to minisql.");
    let mut lines = io::stdin().lock().lines();
    loop {
        print!("{}", config.prompt);
        if let Err(e) = io::stdout().flush() {
            error!("failed to flush stdout: {e}");
            return ExitCode::FAILURE;
        }

        let line = match lines.next() {
            None => break,
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                error!("failed to read input: {e}");
                return ExitCode::FAILURE;
            }
        };

        match line.trim() {
            "" => continue,
            ".exit" | ".quit" => break,
            ".tables" => {
                for name in backend.table_names() {
                    println!("{name}");
                }
            }
            ".memory" => println!("{} bytes", backend.memory_usage()),
            sql => {
                if !execute(&mut backend, sql) && config.halt_on_error {
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

/// Runs every statement of `sql`, printing `ok` after each one and the result
/// table after a SELECT. Returns `false` at the first error.
fn execute(backend: &mut MemoryBackend, sql: &str) -> bool {
    let ast = match minisql::parse(sql) {
        Ok(ast) => ast,
        Err(e) => {
            eprintln!("Error: {e}");
            return false;
        }
    };

    for statement in &ast.statements {
        match backend.execute(statement) {
            Ok(ExecutionResult::Select(result)) => {
                print!("{result}");
                println!("ok");
            }
            Ok(_) => println!("ok"),
            Err(e) => {
                eprintln!("Error: {e}");
                return false;
            }
        }
    }
    true
}
