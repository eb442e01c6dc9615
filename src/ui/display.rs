//! Formatting of item results and status diffs

use console::Style;
use serde_json::Value;

use crate::items::ItemStatus;
use crate::operations::{ItemOutcome, ItemResult, Summary};

fn outcome_style(outcome: ItemOutcome) -> Style {
    match outcome {
        ItemOutcome::Ok => Style::new().green(),
        ItemOutcome::Fixed => Style::new().green().bold(),
        ItemOutcome::Failed => Style::new().red().bold(),
        ItemOutcome::Skipped => Style::new().yellow(),
    }
}

fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "<none>".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// One line per incorrect key: `key  actual → should`
pub fn format_status_diff(status: &ItemStatus) -> String {
    let key_style = Style::new().bold();
    let old_style = Style::new().red();
    let new_style = Style::new().green();

    if status.cdict.is_none() {
        return format!(
            "  {}  {} → {}",
            key_style.apply_to("type"),
            old_style.apply_to("exists"),
            new_style.apply_to("<none>")
        );
    }

    status
        .keys
        .iter()
        .map(|key| {
            let should = status.cdict.as_ref().and_then(|c| c.get(key));
            let actual = status.sdict.as_ref().and_then(|s| s.get(key));
            format!(
                "  {}  {} → {}",
                key_style.apply_to(key),
                old_style.apply_to(format_value(actual)),
                new_style.apply_to(format_value(should))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<node>  <outcome>  <item id>` with keys and reason where present
pub fn format_result(node: &str, result: &ItemResult) -> String {
    let mut line = format!(
        "{}  {:<7}  {}",
        Style::new().cyan().apply_to(node),
        outcome_style(result.outcome).apply_to(result.outcome.as_str()),
        result.id
    );
    if !result.keys.is_empty() {
        line.push_str(&format!(" ({})", result.keys.join(", ")));
    }
    if let Some(reason) = &result.reason {
        line.push_str(&format!(": {reason}"));
    }
    line
}

pub fn format_summary(node: &str, summary: &Summary) -> String {
    format!(
        "{}  {} items: {} ok, {} fixed, {} failed, {} skipped",
        Style::new().cyan().bold().apply_to(node),
        summary.total(),
        summary.ok,
        summary.fixed,
        summary.failed,
        summary.skipped
    )
}
