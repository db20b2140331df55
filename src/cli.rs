//! CLI surface and the linear read → infer → emit → validate pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;

use crate::errors::ValidationError;
use crate::inference::time::TIME_FORMATS;
use crate::inference::{DraftOptions, Inference, IndicatorField};
use crate::{pantherlog, sample, schema, testcase};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Namespace prefix every custom schema name must carry.
pub const SCHEMA_NAME_PREFIX: &str = "Custom.";

/// Indicator types pantherlog accepts.
const INDICATOR_TYPES: [&str; 15] = [
    "ip",
    "domain",
    "hostname",
    "url",
    "net_addr",
    "sha256",
    "sha1",
    "md5",
    "trace_id",
    "aws_arn",
    "aws_instance_id",
    "aws_account_id",
    "aws_tag",
    "username",
    "email",
];

const INDICATOR_DOC_LINKS: [&str; 2] = [
    "https://docs.runpanther.io/development/writing-parsers#indicator-strings",
    "https://docs.runpanther.io/data-onboarding/custom-log-types/reference#indicators",
];

/// infer a Panther custom-log schema from sample JSON logs and validate it
/// with the pantherlog binary
#[derive(Parser, Debug)]
#[command(name = "ezpantherlog")]
pub struct CommandLineInterface {
    /// The sample of logs you are building a schema for; evaluated relative
    /// to the current path, not the git root.
    #[arg(long)]
    logs: PathBuf,

    /// The full path to your pantherlog binary; evaluated relative to the
    /// current path, not the git root.
    #[arg(long)]
    pantherlog_dir: PathBuf,

    /// The name of the schema to use for the `schema` key in your schema
    /// file; if you don't add `Custom.` we add it for you.
    #[arg(long, value_parser = parse_schema_name)]
    schema_name: String,

    /// The name to give your schema file; example: ldap
    #[arg(long)]
    schema_file_name: String,

    /// The field that will be used as your isEventTime key.
    #[arg(long)]
    event_time_field: String,

    /// Timestamp format for the event-time field; guessed from the sample
    /// when omitted.
    #[arg(long, value_parser = TIME_FORMATS)]
    time_format: Option<String>,

    /// Adds an indicator type to a specific field; format is
    /// {indicator type} {field name}.
    #[arg(long, num_args = 2, value_names = ["TYPE", "FIELD"], action = clap::ArgAction::Append)]
    indicator_field: Vec<String>,

    /// Converts a type of 'object' to a type of 'json'; specify the name of
    /// the field to convert.
    #[arg(long, action = clap::ArgAction::Append)]
    json_field: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        println!("\n✨ Starting...");

        let schema_file = PathBuf::from(format!("{}.yml", self.schema_file_name));
        let test_file = PathBuf::from(format!("{}_tests.yml", self.schema_file_name));
        let indicator_fields = self.indicator_fields()?;

        let records = sample::read_log_sample(&self.logs)
            .with_context(|| format!("failed to read log sample {}", self.logs.display()))?;

        println!("💥 Inferring your schema");
        let mut inference = Inference::new(&self.event_time_field);
        for record in &records {
            inference.observe_record(&record.fields);
        }
        let draft = inference.solve(&DraftOptions {
            time_format: self.time_format.clone(),
            json_fields: self.json_field.clone(),
            indicator_fields: indicator_fields.clone(),
        })?;

        println!("🔥 Writing your schema and tests");
        let doc = schema::SchemaDoc::build(&self.schema_name, &draft);
        schema::write_schema_file(&schema_file, &doc)?;
        testcase::write_test_file(&test_file, &self.schema_name, &records, &draft)?;

        println!("💫 Testing your schema");
        let validation = pantherlog::test_schema(&self.pantherlog_dir, &schema_file, &test_file)?;
        if !validation.passed {
            return Err(ValidationError::Failed {
                output: validation.output,
            }
            .into());
        }

        println!("{}", "🌟 All tests passed!".green().bold());
        let cwd = std::env::current_dir().context("unable to resolve the current directory")?;
        println!("\n   -> {}", cwd.join(&schema_file).display());
        println!("   -> {}", cwd.join(&test_file).display());

        if indicator_fields.is_empty() {
            print_indicator_reminder();
        }
        Ok(())
    }

    /// Pair up and validate the repeated `--indicator-field TYPE FIELD`
    /// values. clap's `num_args = 2` guarantees an even count.
    fn indicator_fields(&self) -> Result<Vec<IndicatorField>> {
        let mut out = Vec::new();
        for pair in self.indicator_field.chunks(2) {
            let [indicator, field] = pair else {
                continue;
            };
            if !INDICATOR_TYPES.contains(&indicator.as_str()) {
                bail!(
                    "{indicator} is not a valid indicator type format, must be one of {INDICATOR_TYPES:?}"
                );
            }
            out.push(IndicatorField {
                indicator: indicator.clone(),
                field: field.clone(),
            });
        }
        Ok(out)
    }
}

fn parse_schema_name(value: &str) -> Result<String, String> {
    let value = if value.starts_with(SCHEMA_NAME_PREFIX) {
        value.to_string()
    } else {
        format!("{SCHEMA_NAME_PREFIX}{value}")
    };
    match value[SCHEMA_NAME_PREFIX.len()..].chars().next() {
        Some(c) if c.is_uppercase() => Ok(value),
        _ => Err(format!("{value} must start with a capital letter.")),
    }
}

fn print_indicator_reminder() {
    println!("\n{}", "🚨 You didn't set any IoC fields!".yellow().bold());
    println!("\n Remember to update your schema file with indicators.");
    println!("\n   Reference:");
    for link in INDICATOR_DOC_LINKS {
        println!("    - {link}");
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 11] = [
        "ezpantherlog",
        "--logs",
        "logs.ndjson",
        "--pantherlog-dir",
        "/usr/local/bin/pantherlog",
        "--schema-name",
        "VPN",
        "--schema-file-name",
        "vpn",
        "--event-time-field",
        "syslogTimestamp",
    ];

    #[test]
    fn schema_name_gets_the_custom_prefix() {
        assert_eq!(parse_schema_name("VPN").unwrap(), "Custom.VPN");
        assert_eq!(parse_schema_name("Custom.VPN").unwrap(), "Custom.VPN");
    }

    #[test]
    fn lowercase_schema_name_is_rejected() {
        assert!(parse_schema_name("vpn").is_err());
        assert!(parse_schema_name("Custom.vpn").is_err());
        assert!(parse_schema_name("").is_err());
    }

    #[test]
    fn required_flags_parse() {
        let cli = CommandLineInterface::try_parse_from(REQUIRED).unwrap();
        assert_eq!(cli.schema_name, "Custom.VPN");
        assert_eq!(cli.schema_file_name, "vpn");
        assert!(cli.time_format.is_none());
    }

    #[test]
    fn missing_required_flag_fails_parsing() {
        let args: Vec<&str> = REQUIRED[..REQUIRED.len() - 2].to_vec();
        assert!(CommandLineInterface::try_parse_from(args).is_err());
    }

    #[test]
    fn time_format_is_a_closed_choice() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--time-format", "unix_ms"]);
        let cli = CommandLineInterface::try_parse_from(args).unwrap();
        assert_eq!(cli.time_format.as_deref(), Some("unix_ms"));

        let mut args = REQUIRED.to_vec();
        args.extend(["--time-format", "iso8601"]);
        assert!(CommandLineInterface::try_parse_from(args).is_err());
    }

    #[test]
    fn indicator_pairs_are_collected_and_validated() {
        let mut args = REQUIRED.to_vec();
        args.extend([
            "--indicator-field",
            "ip",
            "srcAddr",
            "--indicator-field",
            "username",
            "user",
        ]);
        let cli = CommandLineInterface::try_parse_from(args).unwrap();
        let pairs = cli.indicator_fields().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].indicator, "ip");
        assert_eq!(pairs[0].field, "srcAddr");

        let mut args = REQUIRED.to_vec();
        args.extend(["--indicator-field", "not_a_type", "srcAddr"]);
        let cli = CommandLineInterface::try_parse_from(args).unwrap();
        assert!(cli.indicator_fields().is_err());
    }

    #[test]
    fn json_fields_are_repeatable() {
        let mut args = REQUIRED.to_vec();
        args.extend(["--json-field", "payload", "--json-field", "extra"]);
        let cli = CommandLineInterface::try_parse_from(args).unwrap();
        assert_eq!(cli.json_field, vec!["payload", "extra"]);
    }
}
