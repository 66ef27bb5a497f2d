//! `example`, `schema`, and `info`: print what the rule says about itself.

use anyhow::Context;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use super::Session;

#[derive(Serialize)]
struct Described<'a> {
    rule: &'a str,
    #[serde(flatten)]
    fields: serde_json::Map<String, serde_json::Value>,
}

fn print(session: &Session, rule: &str, key: &str, value: Option<&str>) -> anyhow::Result<()> {
    debug!(rule, key, present = value.is_some(), "describing rule");
    if session.json {
        let mut fields = serde_json::Map::new();
        fields.insert(key.to_string(), value.map_or(serde_json::Value::Null, Into::into));
        return super::print_json(&Described { rule, fields });
    }
    match value {
        Some(text) => println!("{text}"),
        None => eprintln!("{}", format!("The {rule} rule has no {key}.").yellow()),
    }
    Ok(())
}

/// Print the rule's example commit message.
#[instrument(name = "cmd_example", skip_all)]
pub fn cmd_example(session: &Session) -> anyhow::Result<()> {
    let rule = session.rule()?;
    print(session, rule.name(), "example", rule.example())
}

/// Print the rule's human-readable schema and its validation pattern.
#[instrument(name = "cmd_schema", skip_all)]
pub fn cmd_schema(session: &Session) -> anyhow::Result<()> {
    let rule = session.rule()?;
    if session.json {
        let mut fields = serde_json::Map::new();
        fields.insert("schema".into(), rule.schema().map_or(serde_json::Value::Null, Into::into));
        fields.insert(
            "schema_pattern".into(),
            rule.schema_pattern().map_or(serde_json::Value::Null, Into::into),
        );
        return super::print_json(&Described {
            rule: rule.name(),
            fields,
        });
    }
    print(session, rule.name(), "schema", rule.schema())?;
    if let Some(pattern) = rule.schema_pattern() {
        eprintln!("{}: {}", "Pattern".dimmed(), pattern.cyan());
    }
    Ok(())
}

/// Print the rule's guidance text (reading `info_path` if configured).
#[instrument(name = "cmd_info", skip_all)]
pub fn cmd_info(session: &Session) -> anyhow::Result<()> {
    let rule = session.rule()?;
    let info = rule.info().context("failed to read rule info")?;
    print(session, rule.name(), "info", info.as_deref())
}
