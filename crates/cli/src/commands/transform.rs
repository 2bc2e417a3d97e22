use crate::util::{CliResult, load_language, parse_variable, read_json_file, read_json_input};
use clap::{Args, ValueEnum};
use jtl::{Limits, Transformer};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ResultFormat {
    /// The result list as one compact JSON array.
    Json,
    /// The result list as an indented JSON array.
    Pretty,
    /// One compact JSON value per line.
    Lines,
}

#[derive(Args, Debug, Clone)]
pub struct TransformArgs {
    /// Transformation program (a JSON file whose root is a `transformation` instruction).
    #[arg(short, long, value_name = "FILE")]
    pub program: PathBuf,
    /// Input document; standard input when omitted or `-`.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,
    #[arg(long = "format", value_enum, default_value_t = ResultFormat::Json)]
    pub format: ResultFormat,
    /// Global variable binding `name=value`, the value parsed as JSON when possible.
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub variables: Vec<String>,
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
    #[arg(long, value_name = "N")]
    pub max_loop_iterations: Option<usize>,
    /// JSON instruction metadata merged over the built-in catalog.
    #[arg(long, value_name = "FILE")]
    pub instruction_spec: Option<PathBuf>,
}

pub fn run(args: &TransformArgs, stdin: &mut dyn Read) -> CliResult<String> {
    let program = read_json_file(&args.program)?;
    let input = read_json_input(args.input.as_deref(), stdin)?;
    let transformer = build_transformer(args)?;

    tracing::info!(program = %args.program.display(), "running transformation");
    let values = transformer.transform_values(input, program)?;
    tracing::debug!(results = values.len(), "transformation finished");
    render(&values, args.format)
}

pub(crate) fn build_transformer(args: &TransformArgs) -> CliResult<Transformer> {
    let mut limits = Limits::default();
    if let Some(max_depth) = args.max_depth {
        limits = limits.with_max_depth(max_depth);
    }
    if let Some(max_loop_iterations) = args.max_loop_iterations {
        limits = limits.with_max_loop_iterations(max_loop_iterations);
    }

    let mut transformer = Transformer::new().with_limits(limits);
    if args.instruction_spec.is_some() {
        transformer = transformer.with_language(load_language(args.instruction_spec.as_deref())?);
    }
    for binding in &args.variables {
        let (name, value) = parse_variable(binding)?;
        transformer = transformer.with_variable(name, value);
    }
    Ok(transformer)
}

pub(crate) fn render(values: &[Value], format: ResultFormat) -> CliResult<String> {
    Ok(match format {
        ResultFormat::Json => serde_json::to_string(values)?,
        ResultFormat::Pretty => serde_json::to_string_pretty(values)?,
        ResultFormat::Lines => {
            values.iter().map(serde_json::to_string).collect::<Result<Vec<_>, _>>()?.join("\n")
        }
    })
}
