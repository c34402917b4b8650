//! End-to-end command tests: parsed command line in, exit code and rendered
//! output out, with the in-memory provider standing in for the window server.

use clap::Parser;
use mado::cli::{CliExecutor, MadoCli};
use mado::config::{parse_config, Config};
use mado::macos::{InMemoryWindowProvider, Operation, ProviderCall, ProviderError};
use mado::models::{Display, Window};
use mado::output::Printer;
use mado::{MadoError, OperationContext};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const CONFIG: &str = r#"
ignore_apps = ["Finder"]

[[presets]]
name = "coding"
description = "Editor left, terminal right"

[[presets.rules]]
app = "Code"
position = [0, 0]
size = [960, 1080]

[[presets.rules]]
app = "Terminal"
position = [960, 0]
size = [960, 1080]
"#;

struct Outcome {
    code: i32,
    stdout: String,
    stderr: String,
}

fn provider_with(windows: Vec<Window>) -> Arc<InMemoryWindowProvider> {
    Arc::new(InMemoryWindowProvider::new_with(
        windows,
        vec![Display::primary(1, "Built-in", 1920, 1080)],
    ))
}

fn desk() -> Vec<Window> {
    vec![
        Window::new("Code", "main.rs", 10, 1, "Built-in").with_frame(100, 100, 800, 600),
        Window::new("Terminal", "zsh", 20, 1, "Built-in").with_frame(-20, 40, 700, 500),
        Window::new("Finder", "Downloads", 30, 1, "Built-in"),
    ]
}

async fn run_with(provider: &Arc<InMemoryWindowProvider>, config: Config, args: &[&str]) -> Outcome {
    let mut argv = vec!["mado"];
    argv.extend_from_slice(args);
    let cli = MadoCli::try_parse_from(argv).expect("valid command line");

    let config = config.with_overrides(cli.format, cli.timeout);
    let printer = Printer::new(config.format, Vec::new(), Vec::new());
    let mut executor = CliExecutor::new(
        provider.clone(),
        config,
        PathBuf::from("/nonexistent/mado/config.toml"),
        printer,
    );
    let code = executor.run_command(cli.command).await;

    let (out, err) = executor.into_printer().into_inner();
    Outcome {
        code,
        stdout: String::from_utf8(out).unwrap(),
        stderr: String::from_utf8(err).unwrap(),
    }
}

async fn run(provider: &Arc<InMemoryWindowProvider>, args: &[&str]) -> Outcome {
    run_with(provider, parse_config(CONFIG).unwrap(), args).await
}

#[tokio::test]
async fn list_hides_ignored_apps() {
    let provider = provider_with(desk());
    let outcome = run(&provider, &["list"]).await;

    assert_eq!(outcome.code, 0);
    assert!(outcome.stdout.contains("main.rs"));
    assert!(!outcome.stdout.contains("Finder"));
}

#[tokio::test]
async fn list_app_filter_bypasses_ignore_list() {
    let provider = provider_with(desk());
    let outcome = run(&provider, &["list", "--app", "FINDER", "--format", "json"]).await;

    assert_eq!(outcome.code, 0);
    let value: serde_json::Value = serde_json::from_str(&outcome.stdout).unwrap();
    let windows = value["windows"].as_array().unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0]["app_name"], "Finder");
}

#[tokio::test]
async fn list_treats_empty_filters_as_unset() {
    let provider = provider_with(desk());
    let outcome = run(&provider, &["list", "--app", "", "--screen", "  "]).await;

    assert_eq!(outcome.code, 0);
    assert!(outcome.stdout.contains("Code"));
    assert!(outcome.stdout.contains("Terminal"));
    assert!(!outcome.stdout.contains("Finder"));
}

#[tokio::test]
async fn list_by_app_groups_windows() {
    let mut windows = desk();
    windows.push(Window::new("Terminal", "vim", 20, 1, "Built-in"));
    let provider = provider_with(windows);

    let outcome = run(&provider, &["list", "--by-app"]).await;
    assert_eq!(outcome.code, 0);
    assert!(outcome.stdout.contains("Terminal (pid 20)\n  zsh"));
    assert!(outcome.stdout.contains("  vim"));
}

#[tokio::test]
async fn non_positive_desktop_is_an_invalid_argument() {
    let provider = provider_with(desk());
    for value in ["0", "-2"] {
        let outcome = run(&provider, &["list", "--desktop", value]).await;
        assert_eq!(outcome.code, 3);
        assert!(outcome.stderr.contains("positive integer"));
    }
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn missing_permission_exits_with_remediation() {
    let provider = provider_with(desk());
    provider.set_permission_granted(false);

    let outcome = run(&provider, &["list"]).await;
    assert_eq!(outcome.code, 2);
    assert!(outcome.stderr.contains("Accessibility permission"));
    assert!(outcome.stderr.contains("Privacy & Security"));

    let outcome = run(&provider, &["preset", "apply", "coding", "--format", "json"]).await;
    assert_eq!(outcome.code, 2);
    let value: serde_json::Value = serde_json::from_str(&outcome.stderr).unwrap();
    assert_eq!(value["error"]["code"], 2);
    assert!(provider.mutations().is_empty());
}

#[tokio::test]
async fn screens_lists_displays() {
    let provider = provider_with(desk());
    let outcome = run(&provider, &["screens"]).await;
    assert_eq!(outcome.code, 0);
    assert!(outcome.stdout.contains("Built-in"));
    assert!(outcome.stdout.contains("1920x1080"));
}

#[tokio::test]
async fn preset_apply_success() {
    let provider = provider_with(desk());
    let outcome = run(&provider, &["preset", "apply", "coding"]).await;

    assert_eq!(outcome.code, 0, "stderr: {}", outcome.stderr);
    assert!(outcome.stdout.contains("2 applied, 0 failed"));
    assert_eq!(provider.mutations().len(), 4);
}

#[tokio::test]
async fn preset_apply_with_ambiguity_exits_5() {
    let mut windows = desk();
    windows.push(Window::new("Terminal", "vim", 21, 1, "Built-in"));
    let provider = provider_with(windows);

    let outcome = run(&provider, &["preset", "apply", "coding"]).await;
    assert_eq!(outcome.code, 5);
    assert!(outcome.stdout.contains("ambiguous-match"));
    assert!(outcome.stdout.contains("1 applied, 1 failed"));
    assert!(outcome.stderr.contains("failed rule"));
}

#[tokio::test]
async fn preset_apply_provider_error_exits_5() {
    let provider = provider_with(desk());
    provider.fail_operation(
        Operation::Resize,
        20,
        ProviderError::platform("resize", "AXError -25200"),
    );

    let outcome = run(&provider, &["preset", "apply", "coding", "--format", "json"]).await;
    assert_eq!(outcome.code, 5);
    let value: serde_json::Value = serde_json::from_str(&outcome.stdout).unwrap();
    assert_eq!(value["rules"][1]["outcome"], "provider_error");
    assert_eq!(value["rules"][1]["failures"][0]["step"], "resize");
}

#[tokio::test]
async fn preset_apply_interrupted_by_cancellation() {
    let provider = provider_with(desk());
    let config = parse_config(CONFIG).unwrap();
    let cli = MadoCli::try_parse_from(["mado", "preset", "apply", "coding"]).unwrap();
    let printer = Printer::new(config.format, Vec::new(), Vec::new());
    let mut executor = CliExecutor::new(provider.clone(), config, PathBuf::new(), printer);

    let ctx = OperationContext::background();
    provider.cancel_after(2, ctx.cancel_handle());
    let err = executor.execute(&ctx, cli.command).await.unwrap_err();

    assert!(matches!(err, MadoError::Cancelled));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(provider.mutations().len(), 2);

    let (out, _) = executor.into_printer().into_inner();
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("operation cancelled"));
    assert!(out.contains("1 applied, 1 failed"));
}

#[tokio::test]
async fn expired_timeout_exits_6() {
    let provider = provider_with(desk());
    let config = Config {
        timeout: Duration::from_nanos(1),
        ..parse_config(CONFIG).unwrap()
    };

    let outcome = run_with(&provider, config, &["list"]).await;
    assert_eq!(outcome.code, 6);
    assert!(outcome.stderr.contains("timed out"));
}

#[tokio::test]
async fn unknown_preset_is_invalid_argument() {
    let provider = provider_with(desk());
    for args in [["preset", "apply", "Coding"], ["preset", "show", "nope"]] {
        let outcome = run(&provider, &args).await;
        assert_eq!(outcome.code, 3);
        assert!(outcome.stderr.contains("unknown preset"));
    }
}

#[tokio::test]
async fn preset_list_and_show() {
    let provider = provider_with(vec![]);

    let outcome = run(&provider, &["preset", "list"]).await;
    assert_eq!(outcome.code, 0);
    assert!(outcome.stdout.contains("coding"));
    assert!(outcome.stdout.contains("Editor left, terminal right"));

    let outcome = run(&provider, &["preset", "show", "coding", "--format", "json"]).await;
    assert_eq!(outcome.code, 0);
    let value: serde_json::Value = serde_json::from_str(&outcome.stdout).unwrap();
    assert_eq!(value["preset"]["rules"][1]["app"], "Terminal");

    // Listing presets never touches the provider
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn preset_validate_reads_the_given_file() {
    let provider = provider_with(vec![]);
    let dir = tempfile::tempdir().unwrap();

    let good = dir.path().join("good.toml");
    std::fs::write(&good, CONFIG).unwrap();
    let outcome = run(&provider, &["preset", "validate", "--file", good.to_str().unwrap()]).await;
    assert_eq!(outcome.code, 0);
    assert!(outcome.stdout.contains("OK (1 preset(s))"));

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "[[presets]]\nname = \"\"\n").unwrap();
    let outcome = run(&provider, &["preset", "validate", "--file", bad.to_str().unwrap()]).await;
    assert_eq!(outcome.code, 3);
    assert!(outcome.stderr.contains("name must not be empty"));

    let missing = dir.path().join("missing.toml");
    let outcome = run(&provider, &["preset", "validate", "--file", missing.to_str().unwrap()]).await;
    assert_eq!(outcome.code, 3);
    assert!(outcome.stderr.contains("not found"));
}

#[tokio::test]
async fn move_places_a_single_window() {
    let provider = provider_with(desk());
    let outcome = run(
        &provider,
        &["move", "--app", "code", "--position", "10,20", "--size", "640x480"],
    )
    .await;

    assert_eq!(outcome.code, 0, "stderr: {}", outcome.stderr);
    assert!(outcome.stdout.starts_with("Moved Code \"main.rs\" (pid 10)"));
    assert_eq!(
        provider.mutations(),
        vec![
            ProviderCall::Move { pid: 10, title: "main.rs".into(), x: 10, y: 20 },
            ProviderCall::Resize { pid: 10, title: "main.rs".into(), width: 640, height: 480 },
        ]
    );
}

#[tokio::test]
async fn move_error_cases() {
    let mut windows = desk();
    windows.push(Window::new("Terminal", "vim", 20, 1, "Built-in"));
    let provider = provider_with(windows);

    let outcome = run(&provider, &["move", "--app", "Code"]).await;
    assert_eq!(outcome.code, 3);

    let outcome = run(&provider, &["move", "--app", "Terminal", "--size", "10x10"]).await;
    assert_eq!(outcome.code, 3);
    assert!(outcome.stderr.contains("Candidates:"));
    assert!(outcome.stderr.contains("\"vim\""));

    let outcome = run(&provider, &["move", "--app", "Safari", "--size", "10x10"]).await;
    assert_eq!(outcome.code, 4);

    assert!(provider.mutations().is_empty());
}

#[tokio::test]
async fn preset_rec_prints_a_loadable_snippet() {
    let mut windows = desk();
    windows.push(Window::new("Slack", "general", 40, 1, "Built-in"));
    windows.push(Window::new("Slack", "random", 40, 1, "Built-in"));
    let provider = provider_with(windows);

    let outcome = run(&provider, &["preset", "rec", "snapshot", "--description", "now"]).await;
    assert_eq!(outcome.code, 0, "stderr: {}", outcome.stderr);
    assert!(outcome.stderr.contains("skipped Slack: 2 windows"));

    let config = parse_config(&outcome.stdout).unwrap();
    let preset = &config.presets[0];
    assert_eq!(preset.name, "snapshot");
    assert_eq!(preset.description.as_deref(), Some("now"));
    // Finder is on the ignore list; Terminal's negative x is clamped
    let apps: Vec<&str> = preset.rules.iter().map(|r| r.app.as_str()).collect();
    assert_eq!(apps, ["Code", "Terminal"]);
    assert_eq!(preset.rules[1].position.x, 0);
    assert_eq!(preset.rules[1].position.y, 40);
    assert!(provider.mutations().is_empty());
}

#[tokio::test]
async fn preset_rec_json_reports_skipped_apps() {
    let mut windows = desk();
    windows.push(Window::new("Slack", "general", 40, 1, "Built-in"));
    windows.push(Window::new("Slack", "random", 40, 1, "Built-in"));
    let provider = provider_with(windows);

    let outcome = run(&provider, &["preset", "rec", "snapshot", "--format", "json"]).await;
    assert_eq!(outcome.code, 0, "stderr: {}", outcome.stderr);

    let value: serde_json::Value = serde_json::from_str(&outcome.stdout).unwrap();
    let config = parse_config(value["toml"].as_str().unwrap()).unwrap();
    assert_eq!(config.presets[0].rules.len(), 2);
    assert_eq!(value["skipped"][0]["app"], "Slack");
    assert_eq!(value["skipped"][0]["windows"], 2);
}

#[tokio::test]
async fn version_and_completion_need_no_provider() {
    let provider = provider_with(Vec::new());
    provider.set_permission_granted(false);

    let version = run(&provider, &["version", "--format", "json"]).await;
    assert_eq!(version.code, 0);
    let value: serde_json::Value = serde_json::from_str(&version.stdout).unwrap();
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));

    let completion = run(&provider, &["completion", "bash"]).await;
    assert_eq!(completion.code, 0);
    assert!(completion.stdout.contains("mado"));
    assert!(provider.calls().is_empty());
}
