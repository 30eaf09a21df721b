//! Report artifacts.
//!
//! Each target's report is written as pretty-printed JSON. The optional HTML
//! page is rendered from that JSON value rather than from the typed model, so
//! it shows exactly what the JSON artifact contains.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde_json::Value;

use netscout_core::Report;

use crate::error::{DiscoverError, Result};

/// Paths written for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedArtifacts {
    pub json: PathBuf,
    pub html: Option<PathBuf>,
}

/// `scan_report_<target>_<index>`, with every character outside
/// `[a-zA-Z0-9.-]` replaced by `_`.
pub fn artifact_stem(target: &str, index: usize) -> String {
    let sanitized: String = target
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("scan_report_{sanitized}_{index}")
}

fn export_error(path: &Path, reason: impl ToString) -> DiscoverError {
    DiscoverError::Export {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| export_error(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| export_error(path, e))
}

/// Write the report as pretty-printed JSON, creating parent directories.
pub fn export_json(report: &Report, path: &Path) -> Result<Value> {
    let value = report.to_json().map_err(|e| export_error(path, e))?;
    let text = serde_json::to_string_pretty(&value).map_err(|e| export_error(path, e))?;
    write_artifact(path, &text)?;
    Ok(value)
}

pub fn export_html(report_json: &Value, path: &Path) -> Result<()> {
    write_artifact(path, &render_html(report_json, Local::now()))
}

/// Write the JSON artifact and, when `html` is set, the HTML page next to it.
pub fn export_report(
    report: &Report,
    output_dir: &Path,
    index: usize,
    html: bool,
) -> Result<ExportedArtifacts> {
    let stem = artifact_stem(report.target(), index);
    let json_path = output_dir.join(format!("{stem}.json"));
    let value = export_json(report, &json_path)?;

    let html_path = if html {
        let path = output_dir.join(format!("{stem}.html"));
        export_html(&value, &path)?;
        Some(path)
    } else {
        None
    };

    tracing::info!(
        target = %report.target(),
        json = %json_path.display(),
        html = ?html_path.as_ref().map(|p| p.display().to_string()),
        "Report exported"
    );

    Ok(ExportedArtifacts {
        json: json_path,
        html: html_path,
    })
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

const STYLE: &str = "body{font-family:sans-serif;margin:0;background:#f4f6f8;color:#222}\
.container{max-width:960px;margin:0 auto;padding:24px}\
.device{background:#fff;border-radius:6px;padding:16px;margin-bottom:16px;box-shadow:0 1px 3px rgba(0,0,0,.1)}\
.info-section{margin-top:12px}\
table{border-collapse:collapse;width:100%}\
td,th{border-bottom:1px solid #e2e6ea;padding:4px 8px;text-align:left;vertical-align:top}\
pre{margin:0;white-space:pre-wrap}\
.timestamp{color:#666;font-size:.9em;margin-top:24px}";

/// Render the report JSON as a standalone HTML page.
pub fn render_html(report: &Value, generated_at: DateTime<Local>) -> String {
    let target = report
        .get("scannedNetworkTarget")
        .map(display_value)
        .unwrap_or_default();
    let devices = report
        .get("devices")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>Network scan report: {}</title>", escape(&target));
    let _ = writeln!(html, "<style>{STYLE}</style>\n</head>\n<body>\n<div class=\"container\">");
    let _ = writeln!(html, "<h1>Network scan report</h1>\n<p>Target: {}</p>", escape(&target));
    if let Some(engine) = report.get("scanEngineInfo").and_then(Value::as_str) {
        let _ = writeln!(html, "<p>Engine: {}</p>", escape(engine));
    }

    if devices.is_empty() {
        html.push_str("<p>No devices found.</p>\n");
    }
    for device in devices {
        render_device(&mut html, device);
    }

    let _ = writeln!(
        html,
        "<div class=\"timestamp\">Report generated {}</div>",
        generated_at.format("%d/%m/%Y %H:%M:%S")
    );
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_device(html: &mut String, device: &Value) {
    let ip = device.get("ip").map(display_value).unwrap_or_default();
    html.push_str("<div class=\"device\">\n");
    let _ = write!(html, "<h2>Device: {}", escape(&ip));
    if let Some(hostname) = device.get("hostname").and_then(Value::as_str) {
        let _ = write!(html, " ({})", escape(hostname));
    }
    html.push_str("</h2>\n");

    for (key, label) in [("mac", "MAC"), ("manufacturer", "Manufacturer"), ("os", "OS")] {
        if let Some(value) = device.get(key).and_then(Value::as_str) {
            let _ = writeln!(html, "<p>{label}: {}</p>", escape(value));
        }
    }

    if let Some(ports) = device.get("openPorts").and_then(Value::as_array) {
        if !ports.is_empty() {
            let services = device.get("services");
            html.push_str("<div class=\"info-section\">\n<h3>Open ports</h3>\n<table>\n");
            for port in ports {
                let port = display_value(port);
                let service = services
                    .and_then(|s| s.get(&port))
                    .map(display_value)
                    .unwrap_or_default();
                let _ = writeln!(
                    html,
                    "<tr><td>{}</td><td>{}</td></tr>",
                    escape(&port),
                    escape(&service)
                );
            }
            html.push_str("</table>\n</div>\n");
        }
    }

    render_info_section(html, "SSH information", device.get("sshInfo"));
    render_info_section(html, "SNMP information", device.get("snmpInfo"));

    html.push_str("</div>\n");
}

fn render_info_section(html: &mut String, title: &str, info: Option<&Value>) {
    let Some(fields) = info.and_then(Value::as_object) else {
        return;
    };
    let _ = writeln!(html, "<div class=\"info-section\">\n<h3>{title}</h3>\n<table>");
    for (key, value) in fields {
        let _ = writeln!(
            html,
            "<tr><th>{}</th><td><pre>{}</pre></td></tr>",
            escape(key),
            escape(&display_value(value))
        );
    }
    html.push_str("</table>\n</div>\n");
}
