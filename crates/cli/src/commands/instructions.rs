use crate::OutputFormat;
use crate::util::{CliResult, load_language};
use clap::Args;
use jtl::Language;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct InstructionsArgs {
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// JSON instruction metadata merged over the built-in catalog, as `transform` takes it.
    #[arg(long, value_name = "FILE")]
    pub instruction_spec: Option<PathBuf>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct InstructionSummary {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_attribute: Option<String>,
    attributes: Vec<String>,
    implemented: bool,
}

pub fn run(args: &InstructionsArgs) -> CliResult<String> {
    let summaries = summarize(&load_language(args.instruction_spec.as_deref())?);
    let output = match args.format {
        OutputFormat::Text => render_text(&summaries),
        OutputFormat::Json => serde_json::to_string_pretty(&summaries)?,
    };
    Ok(output)
}

fn summarize(language: &Language) -> Vec<InstructionSummary> {
    language
        .catalog()
        .iter()
        .map(|(name, spec)| InstructionSummary {
            name: name.clone(),
            primary_attribute: spec.primary_attribute.clone(),
            attributes: spec.attributes.clone(),
            implemented: language.handler(name).is_some(),
        })
        .collect()
}

fn render_text(summaries: &[InstructionSummary]) -> String {
    let mut output = String::new();
    for summary in summaries {
        let name = summary.name.if_supports_color(Stream::Stdout, |t| t.bold().to_string());
        let _ = write!(&mut output, "{name}");
        if !summary.attributes.is_empty() {
            let attributes: Vec<String> = summary
                .attributes
                .iter()
                .map(|attribute| {
                    if summary.primary_attribute.as_deref() == Some(attribute.as_str()) {
                        format!("*{attribute}")
                    } else {
                        attribute.clone()
                    }
                })
                .collect();
            let list = attributes.join(", ");
            let _ = write!(&mut output, " ({})", list.if_supports_color(Stream::Stdout, |t| t.dimmed().to_string()));
        }
        if !summary.implemented {
            output.push_str(" [no handler]");
        }
        output.push('\n');
    }
    output.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    fn plain(summaries: &[InstructionSummary]) -> String {
        owo_colors::set_override(false);
        render_text(summaries)
    }

    #[rstest]
    fn lists_the_working_draft() {
        let summaries = summarize(&Language::working_draft());
        assert!(summaries.iter().all(|s| s.implemented));
        let for_each = summaries.iter().find(|s| s.name == "forEach").unwrap();
        assert_eq!(for_each.primary_attribute.as_deref(), Some("select"));
        assert_eq!(for_each.attributes, ["select", "produce"]);
    }

    #[rstest]
    fn text_marks_the_primary_attribute() {
        let text = plain(&summarize(&Language::working_draft()));
        assert!(text.lines().any(|line| line == "if (*test, produce)"));
        assert!(text.lines().any(|line| line == "current"));
    }

    #[rstest]
    fn json_is_a_list_of_specs() {
        let out = run(&InstructionsArgs { format: OutputFormat::Json, instruction_spec: None }).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        let entries = parsed.as_array().unwrap();
        assert!(entries.iter().any(|e| e["name"] == "union" && e["primaryAttribute"] == "test"));
    }

    #[rstest]
    fn lists_a_catalog_loaded_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = r#"{ "count": { "primaryAttribute": "other", "attributes": ["select"] },
                           "shout": { "attributes": ["select"] } }"#;
        std::fs::write(&path, catalog).unwrap();

        let out = run(&InstructionsArgs { format: OutputFormat::Json, instruction_spec: Some(path) }).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        let entries = parsed.as_array().unwrap();
        let count = entries.iter().find(|e| e["name"] == "count").unwrap();
        assert_eq!(count["primaryAttribute"], "other");
        let shout = entries.iter().find(|e| e["name"] == "shout").unwrap();
        assert_eq!(shout["implemented"], false);
    }

    #[rstest]
    fn unreadable_catalog_is_an_error() {
        let args = InstructionsArgs { format: OutputFormat::Text, instruction_spec: Some(PathBuf::from("no/such/catalog.json")) };
        assert!(format!("{:#}", run(&args).unwrap_err()).contains("catalog.json"));
    }
}
