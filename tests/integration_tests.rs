//! Integration tests for mado
//! Exercise the public services against the in-memory provider

use mado::macos::{InMemoryWindowProvider, ProviderCall, WindowProvider};
use mado::models::{Display, FilterCriteria, Window};
use mado::{OperationContext, WindowService};
use std::sync::Arc;

fn screens() -> Vec<Display> {
    vec![
        Display::primary(1, "Built-in Retina Display", 1728, 1117),
        Display {
            id: 2,
            name: "DELL U2720Q".to_string(),
            x: 1728,
            y: 0,
            width: 2560,
            height: 1440,
            is_primary: false,
        },
    ]
}

fn desk() -> Vec<Window> {
    vec![
        Window::new("Code", "main.rs", 10, 2, "DELL U2720Q").on_desktop(1),
        Window::new("Terminal", "zsh", 20, 2, "DELL U2720Q").on_desktop(1),
        Window::new("Finder", "Downloads", 30, 1, "Built-in Retina Display"),
        Window::new("Slack", "general", 40, 1, "Built-in Retina Display").on_desktop(2),
    ]
}

fn provider_with(windows: Vec<Window>) -> Arc<InMemoryWindowProvider> {
    Arc::new(InMemoryWindowProvider::new_with(windows, screens()))
}

mod filter_pipeline {
    use super::*;

    #[test]
    fn desktop_zero_window_passes_desktop_filter() {
        let provider = provider_with(vec![
            Window::new("Finder", "Desktop", 30, 1, "Built-in Retina Display"),
        ]);
        let service = WindowService::new(provider);
        let ctx = OperationContext::background();
        let criteria = FilterCriteria::new().with_desktop(std::num::NonZeroU32::new(1).unwrap());

        let windows = service.list_windows(&ctx, &criteria).unwrap();
        assert_eq!(windows.len(), 1);
    }

    #[test]
    fn finder_is_ignored_unless_asked_for() {
        let service = WindowService::new(provider_with(desk()));
        let ctx = OperationContext::background();

        let hidden = service
            .list_windows(&ctx, &FilterCriteria::new().with_ignore_apps(["Finder"]))
            .unwrap();
        assert!(hidden.iter().all(|w| w.app_name != "Finder"));

        let shown = service
            .list_windows(
                &ctx,
                &FilterCriteria::new()
                    .with_ignore_apps(["Finder"])
                    .with_app("finder"),
            )
            .unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].app_name, "Finder");
    }

    #[test]
    fn screen_and_desktop_filters_combine() {
        let service = WindowService::new(provider_with(desk()));
        let ctx = OperationContext::background();
        let criteria = FilterCriteria::new()
            .with_screen("built-in retina display")
            .with_desktop(std::num::NonZeroU32::new(2).unwrap());

        let apps: Vec<String> = service
            .list_windows(&ctx, &criteria)
            .unwrap()
            .into_iter()
            .map(|w| w.app_name)
            .collect();
        assert_eq!(apps, ["Finder", "Slack"]);
    }
}

mod preset_apply {
    use super::*;
    use mado::models::{Position, Preset, Rule, RuleOutcome, Size};
    use mado::{Interruption, LayoutOrchestrator};

    fn coding() -> Preset {
        Preset::new(
            "coding",
            vec![
                Rule::new("Code", Position::new(0, 0), Size::new(960, 1080)),
                Rule::new("Terminal", Position::new(960, 0), Size::new(960, 1080)),
            ],
        )
    }

    #[test]
    fn two_rule_preset_moves_then_resizes_in_order() {
        let provider = provider_with(desk());
        let orchestrator = LayoutOrchestrator::new(provider.clone());
        let ctx = OperationContext::background();

        let report = orchestrator.run_preset(&ctx, &coding()).unwrap();
        assert!(report.is_success());
        assert_eq!(report.applied_count(), 2);

        let mutations = provider.mutations();
        assert_eq!(mutations.len(), 4);
        assert!(matches!(mutations[0], ProviderCall::Move { pid: 10, x: 0, y: 0, .. }));
        assert!(matches!(mutations[1], ProviderCall::Resize { pid: 10, width: 960, .. }));
        assert!(matches!(mutations[2], ProviderCall::Move { pid: 20, x: 960, .. }));
        assert!(matches!(mutations[3], ProviderCall::Resize { pid: 20, height: 1080, .. }));

        let terminal = provider
            .windows()
            .into_iter()
            .find(|w| w.pid == 20)
            .unwrap();
        assert_eq!((terminal.x, terminal.y, terminal.width, terminal.height), (960, 0, 960, 1080));
    }

    #[test]
    fn ambiguous_terminal_leaves_code_applied() {
        let mut windows = desk();
        windows.push(Window::new("Terminal", "vim", 21, 2, "DELL U2720Q"));
        let provider = provider_with(windows);
        let orchestrator = LayoutOrchestrator::new(provider.clone());
        let ctx = OperationContext::background();

        let report = orchestrator.run_preset(&ctx, &coding()).unwrap();

        assert!(report.rules[0].outcome.is_applied());
        match &report.rules[1].outcome {
            RuleOutcome::AmbiguousMatch { candidates } => {
                let pids: Vec<u32> = candidates.iter().map(|c| c.pid).collect();
                assert_eq!(pids, [20, 21]);
            }
            other => panic!("expected ambiguous match, got {other:?}"),
        }
        assert!(provider
            .mutations()
            .iter()
            .all(|call| matches!(call, ProviderCall::Move { pid: 10, .. } | ProviderCall::Resize { pid: 10, .. })));
    }

    #[test]
    fn cancellation_keeps_earlier_rules_applied() {
        let provider = provider_with(desk());
        let ctx = OperationContext::background();
        provider.cancel_after(2, ctx.cancel_handle());
        let orchestrator = LayoutOrchestrator::new(provider.clone());

        let report = orchestrator.run_preset(&ctx, &coding()).unwrap();

        assert!(report.rules[0].outcome.is_applied());
        assert_eq!(
            report.rules[1].outcome,
            RuleOutcome::cancelled(Interruption::Cancelled)
        );
    }

    #[test]
    fn provider_is_usable_as_trait_object() {
        let provider: Arc<dyn WindowProvider> = provider_with(desk());
        let ctx = OperationContext::background();
        assert_eq!(provider.list_screens(&ctx).unwrap().len(), 2);
        assert!(provider.check_permission().is_ok());
    }
}

mod config_loading {
    use mado::config::{load_config, presets_to_toml, resolve_config_path, ConfigError};
    use mado::output::OutputFormat;
    use std::fs;
    use std::time::Duration;

    #[test]
    fn loads_config_file_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
format = "json"
timeout = "500ms"
ignore_apps = ["Finder"]

[[presets]]
name = "focus"
[[presets.rules]]
app = "Code"
position = [0, 0]
size = [1728, 1117]
"#,
        )
        .unwrap();

        let resolved = resolve_config_path(Some(&path));
        let config = load_config(&resolved).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert_eq!(config.ignore_apps, ["Finder"]);
        assert_eq!(config.presets[0].name, "focus");

        let snippet = presets_to_toml(&config.presets).unwrap();
        assert!(snippet.contains("name = \"focus\""));
    }

    #[test]
    fn invalid_file_reports_all_problems() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[[presets]]
name = "dup"
[[presets.rules]]
app = "Code"
position = [0, -1]
size = [10, 10]

[[presets]]
name = "dup"
[[presets.rules]]
app = "Code"
position = [0, 0]
size = [10, 10]
"#,
        )
        .unwrap();

        match load_config(&path) {
            Err(ConfigError::Invalid(issues)) => {
                assert_eq!(issues.len(), 2);
                let text = ConfigError::Invalid(issues).to_string();
                assert!(text.contains("duplicate preset name"));
                assert!(text.contains("must not be negative"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
