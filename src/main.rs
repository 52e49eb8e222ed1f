use clap::{Parser, Subcommand};
use json_logic_check::{check_data_paths, Evaluator, Validator};
use serde_json::Value;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Validate or evaluate JSONLogic rules. RULE and DATA are inline JSON, or
/// `@path` to read a file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a rule's structure without running it
    Validate {
        rule: String,
        /// Also check that every `var` path resolves against this data
        #[arg(long)]
        data: Option<String>,
        /// Extra operator name to accept (repeatable)
        #[arg(long = "custom-op")]
        custom_ops: Vec<String>,
    },
    /// Evaluate a rule against data (defaults to `{}`)
    Eval { rule: String, data: Option<String> },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn load(arg: &str) -> Result<Value, String> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).map_err(|e| format!("invalid JSON: {e}"))
}

fn print_json(v: &Value) {
    match serde_json::to_string_pretty(v) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("cannot render output: {e}"),
    }
}

fn run(args: Args) -> Result<bool, String> {
    match args.command {
        Command::Validate { rule, data, custom_ops } => {
            let rule = load(&rule)?;
            let report = Validator::new().with_custom_operators(custom_ops).validate(&rule);
            let mut out = serde_json::to_value(&report).map_err(|e| e.to_string())?;
            if let Some(data) = data {
                let data = load(&data)?;
                out["data_paths"] = Value::from(check_data_paths(&rule, &data));
            }
            print_json(&out);
            Ok(report.valid)
        }
        Command::Eval { rule, data } => {
            let rule = load(&rule)?;
            let data = match data {
                Some(d) => load(&d)?,
                None => Value::Object(Default::default()),
            };
            let out = Evaluator::default()
                .evaluate(&rule, &data)
                .map_err(|e| e.to_string())?;
            print_json(&out);
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    // Parse CLI arguments.
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
