use crate::output::{print_json, print_table};
use anyhow::Result;
use std::path::Path;
use upkeep_core::config::Config;

/// List the whitelisted actions, as a table or JSON.
pub fn run(root: &Path, json: bool) -> Result<()> {
    let config = Config::load(root)?;

    if json {
        return print_json(&config.actions);
    }

    let headers = &["ID", "LABEL", "DESCRIPTION"];
    let rows: Vec<Vec<String>> = config
        .actions
        .iter()
        .map(|a| vec![a.id.clone(), a.label.clone(), a.description.clone()])
        .collect();
    print_table(headers, rows);
    Ok(())
}
