//! Ls command: list registered rules.

use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::instrument;

use super::Session;

#[derive(Serialize)]
struct RuleEntry<'a> {
    name: &'a str,
    selected: bool,
}

/// Print every registered rule name, marking the one in effect.
#[instrument(name = "cmd_ls", skip_all)]
pub fn cmd_ls(session: &Session) -> anyhow::Result<()> {
    let selected = session.rule_name();
    let entries: Vec<_> = session
        .registry
        .names()
        .into_iter()
        .map(|name| RuleEntry {
            name,
            selected: name == selected,
        })
        .collect();

    if session.json {
        return super::print_json(&entries);
    }
    for entry in entries {
        if entry.selected {
            println!("{} {}", entry.name.green().bold(), "(selected)".dimmed());
        } else {
            println!("{}", entry.name);
        }
    }
    Ok(())
}
