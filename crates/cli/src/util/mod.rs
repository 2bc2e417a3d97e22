use anyhow::{Context, bail};
use jtl::Language;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;

pub type CliResult<T> = anyhow::Result<T>;

/// Read and parse a JSON file.
pub fn read_json_file(path: &Path) -> CliResult<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Read a JSON document from a file, or from `stdin` when the path is absent or `-`.
pub fn read_json_input(path: Option<&Path>, stdin: &mut dyn Read) -> CliResult<Value> {
    match path {
        Some(path) if path != Path::new("-") => read_json_file(path),
        _ => {
            let mut text = String::new();
            stdin.read_to_string(&mut text).context("cannot read standard input")?;
            serde_json::from_str(&text).context("standard input is not valid JSON")
        }
    }
}

/// The built-in language, with the instruction metadata in `catalog` merged
/// over its catalog when given.
pub fn load_language(catalog: Option<&Path>) -> CliResult<Language> {
    let language = Language::working_draft();
    let Some(path) = catalog else {
        return Ok(language);
    };
    let text = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let catalog = Language::catalog_from_json(&text)
        .with_context(|| format!("{} is not a valid instruction catalog", path.display()))?;
    Ok(language.with_catalog(catalog))
}

/// Parse a `name=value` binding. The value is read as JSON and falls back to
/// a plain string when it does not parse.
pub fn parse_variable(binding: &str) -> CliResult<(String, Value)> {
    let Some((name, raw)) = binding.split_once('=') else {
        bail!("variable binding '{binding}' is not of the form name=value");
    };
    if !jtl::is_valid_symbol(name) {
        bail!("'{name}' is not a valid variable name");
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    Ok((name.to_owned(), value))
}
