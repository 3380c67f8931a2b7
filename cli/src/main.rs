//! rematch CLI — driving adapter for the rematch pattern engine.
//!
//! Subcommands:
//! - `eval <pattern> <input> [--lazy] [--diagnostics]` — match input against a pattern
//! - `check <pattern>` — validate a pattern loads without errors
//! - `info` — print registered named matchers and limits

use std::io::Read;
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use rematch::{PatternConfig, Registry, Value};
use tracing::{debug, Level};

/// Structural pattern matching over JSON and YAML data
#[derive(Parser, Debug)]
#[command(name = "rematch", version)]
struct Args {
    /// Log engine decisions to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Match an input document against a pattern
    Eval {
        /// Pattern config file (.json, or YAML otherwise)
        pattern: String,
        /// Input file (.json, or YAML otherwise); `-` reads JSON from stdin
        input: String,
        /// Feed a top-level array as a one-pass sequence
        #[arg(long)]
        lazy: bool,
        /// Print the full match result instead of the bound value
        #[arg(long)]
        diagnostics: bool,
    },
    /// Validate a pattern config
    Check {
        /// Pattern config file (.json, or YAML otherwise)
        pattern: String,
    },
    /// Print registered named matchers
    Info,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match args.command {
        Command::Eval {
            pattern,
            input,
            lazy,
            diagnostics,
        } => cmd_eval(&pattern, &input, lazy, diagnostics),
        Command::Check { pattern } => cmd_check(&pattern),
        Command::Info => cmd_info(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_eval(pattern_path: &str, input_path: &str, lazy: bool, diagnostics: bool) -> Result<(), String> {
    let config: PatternConfig = load_document(pattern_path)?;
    let matcher = build_registry()
        .load_pattern(config)
        .map_err(|e| format!("pattern load failed: {e}"))?;

    let document: serde_json::Value = if input_path == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error: {e}"))?
    } else {
        load_document(input_path)?
    };
    let input = to_input(document, lazy);
    debug!(input = input.type_name(), lazy, "evaluating");

    let result = matcher
        .apply(&input)
        .map_err(|e| format!("evaluation failed: {e}"))?;

    if diagnostics {
        println!("{}", render(&result.to_json()));
    } else {
        match result.value() {
            Some(value) => println!("{}", render(&value.to_json())),
            None => println!("(no match)"),
        }
    }
    Ok(())
}

fn cmd_check(pattern_path: &str) -> Result<(), String> {
    let config: PatternConfig = load_document(pattern_path)?;
    let matcher = build_registry()
        .load_pattern(config)
        .map_err(|e| format!("pattern invalid: {e}"))?;

    println!("Pattern valid (depth {})", matcher.depth());
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_info() -> Result<(), String> {
    let registry = build_registry();

    println!("Registered matchers:");
    for name in registry.names() {
        println!("  {name}");
    }

    println!("\nLimits:");
    println!("  max depth:                 {}", rematch::MAX_DEPTH);
    println!("  max patterns per compound: {}", rematch::MAX_PATTERNS_PER_COMPOUND);
    println!("  max regex pattern length:  {}", rematch::MAX_REGEX_PATTERN_LENGTH);

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_registry() -> Registry {
    rematch_test::register(rematch::RegistryBuilder::new()).build()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Document loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_document<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;
    parse_document(path, &content)
}

fn parse_document<T: serde::de::DeserializeOwned>(path: &str, content: &str) -> Result<T, String> {
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

fn to_input(document: serde_json::Value, lazy: bool) -> Value {
    match document {
        serde_json::Value::Array(items) if lazy => {
            let values: Vec<Value> = items.into_iter().map(Value::from).collect();
            Value::sequence(values)
        }
        other => Value::from(other),
    }
}

fn render(json: &serde_json::Value) -> String {
    serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
}
