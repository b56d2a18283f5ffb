//! Rendering of comparison results for the terminal.

use std::fmt::Write as _;

use chrono::DateTime;
use colored::*;
use serde_json::Value;

use crate::config::EXAMPLE_TARGETS;
use crate::results::{group_by_service, Attempt, AttemptState, StatusClass};
use crate::services::{CredentialRule, ServiceRegistry, SettingKind};

/// Human-readable size with decimal units, e.g. `1.23 kB`.
pub fn pretty_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];
    if bytes < 1000 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    // Three significant digits
    let text = if value >= 100.0 {
        format!("{:.0}", value)
    } else if value >= 10.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    };
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    format!("{} {}", text, UNITS[unit])
}

/// Short description of a parsed body.
pub fn data_summary(parsed: Option<&Value>) -> String {
    match parsed {
        None => "-".to_string(),
        Some(Value::Array(items)) => format!("{} items", items.len()),
        Some(Value::Object(map)) => format!("{} keys", map.len()),
        Some(_) => "unknown".to_string(),
    }
}

fn status_badge(status: u16) -> ColoredString {
    let text = format!("{:<5}", status);
    match StatusClass::from_status(status) {
        StatusClass::Success => text.green(),
        StatusClass::Redirect => text.yellow(),
        StatusClass::ClientError => text.magenta(),
        StatusClass::ServerError => text.red(),
    }
}

fn format_timestamp(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn attempt_row(attempt: &Attempt) -> String {
    let time = format_timestamp(&attempt.timestamp);
    match &attempt.state {
        AttemptState::Pending => format!("  {}  {}", time, "pending".dimmed()),
        AttemptState::Failed(failure) => format!(
            "  {}  {}  {:>8}  {}: {}",
            time,
            format!("{:<5}", "ERR").red().bold(),
            format!("{} ms", failure.duration_ms),
            failure.kind,
            failure.error_message
        ),
        AttemptState::Succeeded(success) => {
            let size = if success.content_length > 0 {
                pretty_bytes(success.content_length)
            } else {
                "-".to_string()
            };
            format!(
                "  {}  {}  {:>8}  {:>9}  {:<10}  {} headers",
                time,
                status_badge(success.status),
                format!("{} ms", success.duration_ms),
                size,
                data_summary(success.parsed_body.as_ref()),
                success.headers.len()
            )
        }
    }
}

/// One block per service, in first-seen order.
pub fn render_table(attempts: &[Attempt], registry: &ServiceRegistry) -> String {
    if attempts.is_empty() {
        return "No results yet\n".to_string();
    }

    let mut out = String::new();
    for (service, attempts) in group_by_service(attempts) {
        let name = registry.get(service).map(|s| s.name).unwrap_or(service);
        let _ = writeln!(out, "{}", name.bold());
        for attempt in attempts {
            let _ = writeln!(out, "{}", attempt_row(attempt));
        }
        out.push('\n');
    }
    out
}

/// Every attempt as a pretty-printed JSON array.
pub fn render_json(attempts: &[Attempt]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(attempts)
}

/// Registered services with their credential rule and settings.
pub fn render_service_list(registry: &ServiceRegistry) -> String {
    let mut out = String::new();
    for service in registry.iter() {
        let _ = writeln!(out, "{} ({})", service.id.bold(), service.name);
        if let Some(link) = service.link {
            let _ = writeln!(out, "    link:      {}", link);
        }
        if let Some(dashboard) = service.dashboard_link {
            let _ = writeln!(out, "    dashboard: {}", dashboard);
        }
        match (service.credential, &service.token_format) {
            (CredentialRule::Optional, _) => {
                let _ = writeln!(out, "    token:     not needed");
            }
            (CredentialRule::Required, Some(format)) => {
                let _ = writeln!(out, "    token:     required, {}", format.hint);
            }
            (CredentialRule::Required, None) => {
                let _ = writeln!(out, "    token:     required");
            }
        }
        for setting in &service.settings {
            let accepted = match &setting.kind {
                SettingKind::Boolean => "true|false".to_string(),
                SettingKind::Text => "text".to_string(),
                SettingKind::Select(options) => options.join("|"),
            };
            let _ = writeln!(
                out,
                "    setting:   {}.{}={} (default {}) {}",
                service.id,
                setting.key,
                accepted,
                setting.default,
                setting.note.dimmed()
            );
        }
    }
    out
}

/// Example targets and the protection they sit behind.
pub fn render_examples() -> String {
    let mut out = String::new();
    for (label, url) in EXAMPLE_TARGETS {
        let _ = writeln!(out, "{:<32} {}", label, url);
    }
    out
}
