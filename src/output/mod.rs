//! Text and JSON rendering for command results.
//!
//! Results go to the `out` stream, errors to `err`. JSON documents are always
//! wrapped in a top-level object (`{"windows": [...]}`, `{"error": {...}}`) so
//! they can be extended without breaking consumers.

use crate::models::preset::{Position, Preset, Size};
use crate::models::report::{ApplyReport, RuleFailure, RuleOutcome};
use crate::models::window::{Application, Display, Window, WindowRef};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// An error ready to be rendered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<WindowRef>,
}

impl ErrorReport {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<WindowRef>) -> Self {
        self.candidates = candidates;
        self
    }
}

pub struct Printer<O: Write, E: Write> {
    format: OutputFormat,
    out: O,
    err: E,
}

impl Printer<io::Stdout, io::Stderr> {
    pub fn stdio(format: OutputFormat) -> Self {
        Self::new(format, io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Printer<O, E> {
    pub fn new(format: OutputFormat, out: O, err: E) -> Self {
        Self { format, out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    pub fn windows(&mut self, windows: &[Window]) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&json!({ "windows": windows }));
        }
        if windows.is_empty() {
            return writeln!(self.out, "No windows found.");
        }

        let rows = windows.iter().map(window_row).collect::<Vec<_>>();
        self.table(
            &["APP", "TITLE", "PID", "SCREEN", "DESKTOP", "POSITION", "SIZE", "STATE"],
            &rows,
        )
    }

    /// Windows grouped under their owning application
    pub fn applications(&mut self, apps: &[Application]) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&json!({ "applications": apps }));
        }
        if apps.is_empty() {
            return writeln!(self.out, "No windows found.");
        }

        for app in apps {
            writeln!(self.out, "{} (pid {})", app.name, app.pid)?;
            for window in &app.windows {
                writeln!(
                    self.out,
                    "  {}  {},{}  {}x{}  {}",
                    display_title(&window.title),
                    window.x,
                    window.y,
                    window.width,
                    window.height,
                    window.state
                )?;
            }
        }
        Ok(())
    }

    pub fn screens(&mut self, screens: &[Display]) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&json!({ "screens": screens }));
        }

        let rows = screens
            .iter()
            .map(|screen| {
                vec![
                    screen.id.to_string(),
                    screen.name.clone(),
                    format!("{},{}", screen.x, screen.y),
                    format!("{}x{}", screen.width, screen.height),
                    if screen.is_primary { "yes" } else { "" }.to_string(),
                ]
            })
            .collect::<Vec<_>>();
        self.table(&["ID", "NAME", "ORIGIN", "SIZE", "PRIMARY"], &rows)
    }

    pub fn presets(&mut self, presets: &[Preset]) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&json!({ "presets": presets }));
        }
        if presets.is_empty() {
            return writeln!(self.out, "No presets configured.");
        }

        let rows = presets
            .iter()
            .map(|preset| {
                vec![
                    preset.name.clone(),
                    preset.rules.len().to_string(),
                    preset.description.clone().unwrap_or_default(),
                ]
            })
            .collect::<Vec<_>>();
        self.table(&["NAME", "RULES", "DESCRIPTION"], &rows)
    }

    pub fn preset(&mut self, preset: &Preset) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&json!({ "preset": preset }));
        }

        writeln!(self.out, "Preset: {}", preset.name)?;
        if let Some(description) = &preset.description {
            writeln!(self.out, "Description: {description}")?;
        }
        writeln!(self.out)?;
        let rows = preset
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                vec![
                    (index + 1).to_string(),
                    rule.app.clone(),
                    rule.position.to_string(),
                    rule.size.to_string(),
                ]
            })
            .collect::<Vec<_>>();
        self.table(&["#", "APP", "POSITION", "SIZE"], &rows)
    }

    pub fn config_valid(&mut self, path: &str, presets: usize) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&json!({ "valid": true, "path": path, "presets": presets }));
        }
        writeln!(self.out, "{path}: OK ({presets} preset(s))")
    }

    pub fn apply_report(&mut self, report: &ApplyReport) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&json!({
                "preset": report.preset,
                "applied": report.applied_count(),
                "failed": report.failed_count(),
                "rules": report.rules,
            }));
        }

        writeln!(self.out, "Preset: {}", report.preset)?;
        for rule in &report.rules {
            let detail = match &rule.outcome {
                RuleOutcome::Applied { window } => {
                    format!("{window} -> {} {}", rule.position, rule.size)
                }
                RuleOutcome::NoMatch => "no open window".to_string(),
                RuleOutcome::AmbiguousMatch { candidates } => {
                    let list = candidates
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{} windows match: {list}", candidates.len())
                }
                RuleOutcome::ProviderError { failures, .. } => failure_summary(failures),
                RuleOutcome::Cancelled { reason, failures } if failures.is_empty() => {
                    reason.to_string()
                }
                RuleOutcome::Cancelled { reason, failures } => {
                    format!("{reason} after {}", failure_summary(failures))
                }
            };
            writeln!(self.out, "  {:<16} {:<20} {detail}", rule.outcome.label(), rule.app)?;
        }
        writeln!(
            self.out,
            "{} applied, {} failed",
            report.applied_count(),
            report.failed_count()
        )
    }

    pub fn moved(
        &mut self,
        window: &WindowRef,
        position: Option<Position>,
        size: Option<Size>,
    ) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&json!({
                "window": window,
                "position": position,
                "size": size,
            }));
        }

        let mut target = Vec::new();
        if let Some(position) = position {
            target.push(format!("position {position}"));
        }
        if let Some(size) = size {
            target.push(format!("size {size}"));
        }
        writeln!(self.out, "Moved {window}: {}", target.join(", "))
    }

    /// Raw text written as-is, for snippets meant to be pasted elsewhere
    /// Recorded preset as a TOML snippet. In JSON the apps left out of the
    /// recording travel with it; text mode warns about them on stderr instead.
    pub fn recording(&mut self, snippet: &str, skipped: &[(String, usize)]) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            let skipped: Vec<_> = skipped
                .iter()
                .map(|(app, windows)| json!({ "app": app, "windows": windows }))
                .collect();
            return self.json(&json!({ "toml": snippet, "skipped": skipped }));
        }
        write!(self.out, "{snippet}")
    }

    pub fn version(&mut self, version: &str) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&json!({ "version": version }));
        }
        writeln!(self.out, "mado {version}")
    }

    /// Shell scripts are written as-is in every format
    pub fn script(&mut self, script: &[u8]) -> io::Result<()> {
        self.out.write_all(script)
    }

    pub fn error(&mut self, report: &ErrorReport) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            let body = serde_json::to_string_pretty(&json!({ "error": report }))?;
            return writeln!(self.err, "{body}");
        }

        writeln!(self.err, "Error: {}", report.message)?;
        if let Some(remediation) = &report.remediation {
            writeln!(self.err, "\n{remediation}")?;
        }
        if !report.candidates.is_empty() {
            writeln!(self.err, "\nCandidates:")?;
            for candidate in &report.candidates {
                writeln!(self.err, "  {candidate}")?;
            }
        }
        Ok(())
    }

    /// Warning line on the error stream; text mode only
    pub fn warning(&mut self, message: &str) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.err, "Warning: {message}"),
            OutputFormat::Json => Ok(()),
        }
    }

    fn json<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        let body = serde_json::to_string_pretty(value)?;
        writeln!(self.out, "{body}")
    }

    fn table(&mut self, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        write_row(&mut self.out, &widths, &header_cells)?;
        for row in rows {
            write_row(&mut self.out, &widths, row)?;
        }
        Ok(())
    }
}

fn write_row<W: Write>(out: &mut W, widths: &[usize], cells: &[String]) -> io::Result<()> {
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (index, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if index == last {
            line.push_str(cell);
        } else {
            let pad = width.saturating_sub(cell.chars().count());
            line.push_str(cell);
            line.push_str(&" ".repeat(pad + 2));
        }
    }
    writeln!(out, "{}", line.trim_end())
}

fn window_row(window: &Window) -> Vec<String> {
    vec![
        window.app_name.clone(),
        display_title(&window.title),
        window.pid.to_string(),
        window.screen_name.clone(),
        match window.desktop {
            0 => "all".to_string(),
            n => n.to_string(),
        },
        format!("{},{}", window.x, window.y),
        format!("{}x{}", window.width, window.height),
        window.state.to_string(),
    ]
}

fn display_title(title: &str) -> String {
    if title.is_empty() {
        "(untitled)".to_string()
    } else {
        title.to_string()
    }
}

fn failure_summary(failures: &[RuleFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{} failed: {}", failure.step, failure.source))
        .collect::<Vec<_>>()
        .join("; ")
}
