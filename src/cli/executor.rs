use super::{Commands, FilterArgs, ListArgs, MadoCli, MoveArgs, PresetActions, RecArgs};
use crate::config::{format_duration, load_config, presets_to_toml, resolve_config_path, Config};
use crate::context::{CancelHandle, OperationContext};
use crate::macos::provider::{ProviderError, WindowProvider};
use crate::models::filter::FilterCriteria;
use crate::models::preset::find_preset;
use crate::models::window::Application;
use crate::output::{ErrorReport, Printer};
use crate::services::{record_preset, LayoutOrchestrator, WindowService};
use crate::MadoError;
use clap::CommandFactory;
use std::io::{self, Write};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Extra time given to a blocking provider call past the deadline before the
/// command gives up on it
const WATCHDOG_GRACE: Duration = Duration::from_millis(500);

/// Load configuration, merge the global flags and run the parsed command.
/// Returns the process exit code.
pub async fn run(cli: MadoCli, provider: Arc<dyn WindowProvider>) -> i32 {
    let config_path = resolve_config_path(cli.config.as_deref());
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(_) if skips_config_load(&cli.command) => Config::default(),
        Err(err) => {
            let err = MadoError::from(err);
            let mut printer = Printer::stdio(cli.format.unwrap_or_default());
            report_error(&mut printer, &err);
            return err.exit_code();
        }
    };

    let config = config.with_overrides(cli.format, cli.timeout);
    debug!(format = %config.format, timeout = ?config.timeout, path = %config_path.display(), "Resolved settings");

    let printer = Printer::stdio(config.format);
    let mut executor = CliExecutor::new(provider, config, config_path, printer);
    executor.run_command(cli.command).await
}

/// Commands that still run when the config file cannot be loaded.
/// `preset validate` reads and reports the file itself.
fn skips_config_load(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Version
            | Commands::Completion { .. }
            | Commands::Preset(super::PresetCommands {
                action: PresetActions::Validate { .. }
            })
    )
}

/// CLI command executor
pub struct CliExecutor<O: Write, E: Write> {
    provider: Arc<dyn WindowProvider>,
    config: Config,
    config_path: PathBuf,
    printer: Printer<O, E>,
}

impl<O: Write, E: Write> CliExecutor<O, E> {
    pub fn new(
        provider: Arc<dyn WindowProvider>,
        config: Config,
        config_path: PathBuf,
        printer: Printer<O, E>,
    ) -> Self {
        Self {
            provider,
            config,
            config_path,
            printer,
        }
    }

    pub fn into_printer(self) -> Printer<O, E> {
        self.printer
    }

    /// Execute `command` under a fresh deadline, render any error and return
    /// the exit code
    pub async fn run_command(&mut self, command: Commands) -> i32 {
        let ctx = OperationContext::with_timeout(self.config.timeout);
        debug!(timeout = %format_duration(self.config.timeout), "Running command");
        let watcher = watch_interrupt(ctx.cancel_handle());

        let result = self.execute(&ctx, command).await;
        watcher.abort();

        match result {
            Ok(()) => 0,
            Err(err) => {
                report_error(&mut self.printer, &err);
                err.exit_code()
            }
        }
    }

    /// Execute a CLI command
    pub async fn execute(
        &mut self,
        ctx: &OperationContext,
        command: Commands,
    ) -> Result<(), MadoError> {
        match command {
            Commands::List(args) => self.list(ctx, args).await,
            Commands::Move(args) => self.move_window(ctx, args).await,
            Commands::Screens => self.screens(ctx).await,
            Commands::Preset(preset_cmd) => match preset_cmd.action {
                PresetActions::Apply { name } => self.apply_preset(ctx, &name).await,
                PresetActions::List => Ok(self.printer.presets(&self.config.presets)?),
                PresetActions::Show { name } => {
                    let preset = find_preset(&self.config.presets, &name)
                        .ok_or_else(|| unknown_preset(&name))?;
                    Ok(self.printer.preset(preset)?)
                }
                PresetActions::Validate { file } => self.validate(file),
                PresetActions::Rec(args) => self.record(ctx, args).await,
            },
            Commands::Version => Ok(self.printer.version(env!("CARGO_PKG_VERSION"))?),
            Commands::Completion { shell } => {
                let mut script = Vec::new();
                clap_complete::generate(shell, &mut MadoCli::command(), "mado", &mut script);
                Ok(self.printer.script(&script)?)
            }
        }
    }

    async fn list(&mut self, ctx: &OperationContext, args: ListArgs) -> Result<(), MadoError> {
        let criteria = self.criteria(&args.filter)?;
        let service = WindowService::new(Arc::clone(&self.provider));

        let windows = run_blocking(ctx, move |ctx| {
            service.ensure_permissions()?;
            Ok(service.list_windows(&ctx, &criteria)?)
        })
        .await?;

        if args.by_app {
            self.printer.applications(&Application::group(&windows))?;
        } else {
            self.printer.windows(&windows)?;
        }
        Ok(())
    }

    async fn screens(&mut self, ctx: &OperationContext) -> Result<(), MadoError> {
        let service = WindowService::new(Arc::clone(&self.provider));
        let screens = run_blocking(ctx, move |ctx| Ok(service.list_screens(&ctx)?)).await?;
        Ok(self.printer.screens(&screens)?)
    }

    async fn move_window(&mut self, ctx: &OperationContext, args: MoveArgs) -> Result<(), MadoError> {
        let MoveArgs {
            app,
            title,
            position,
            size,
        } = args;
        if position.is_none() && size.is_none() {
            return Err(MadoError::InvalidArgument(
                "at least one of --position or --size is required".to_string(),
            ));
        }

        let provider = Arc::clone(&self.provider);
        let (window, failures) = run_blocking(ctx, move |ctx| {
            let service = WindowService::new(Arc::clone(&provider));
            service.ensure_permissions()?;
            let window = service.find_window(&ctx, &app, title.as_deref())?.window_ref();
            let failures = LayoutOrchestrator::new(provider).place(&ctx, &window, position, size)?;
            Ok((window, failures))
        })
        .await?;

        if let Some(first) = failures.first() {
            let message = failures
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(match first.source {
                ProviderError::WindowNotFound { .. } => MadoError::WindowNotFound(message),
                _ => MadoError::Provider(message),
            });
        }

        info!(%window, "Window placed");
        Ok(self.printer.moved(&window, position, size)?)
    }

    async fn apply_preset(&mut self, ctx: &OperationContext, name: &str) -> Result<(), MadoError> {
        let preset = find_preset(&self.config.presets, name)
            .cloned()
            .ok_or_else(|| unknown_preset(name))?;

        let provider = Arc::clone(&self.provider);
        let report = run_blocking(ctx, move |ctx| {
            provider.check_permission()?;
            Ok(LayoutOrchestrator::new(provider).run_preset(&ctx, &preset)?)
        })
        .await?;

        self.printer.apply_report(&report)?;

        match report.interruption() {
            Some(reason) => Err(reason.into()),
            None if report.is_success() => Ok(()),
            None => Err(MadoError::PresetFailed {
                preset: report.preset.clone(),
                failed: report.failed_count(),
            }),
        }
    }

    fn validate(&mut self, file: Option<PathBuf>) -> Result<(), MadoError> {
        let path = file.unwrap_or_else(|| self.config_path.clone());
        if !path.exists() {
            return Err(MadoError::Configuration(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let config = load_config(&path)?;
        Ok(self
            .printer
            .config_valid(&path.display().to_string(), config.presets.len())?)
    }

    async fn record(&mut self, ctx: &OperationContext, args: RecArgs) -> Result<(), MadoError> {
        if args.name.trim().is_empty() {
            return Err(MadoError::InvalidArgument(
                "preset name must not be empty".to_string(),
            ));
        }
        let criteria = self.criteria(&args.filter)?;
        let service = WindowService::new(Arc::clone(&self.provider));

        let windows = run_blocking(ctx, move |ctx| {
            service.ensure_permissions()?;
            Ok(service.list_windows(&ctx, &criteria)?)
        })
        .await?;

        let mut recording = record_preset(&args.name, &windows);
        for (app, count) in &recording.skipped {
            warn!(app = %app, windows = count, "Skipping app with several windows");
            self.printer.warning(&format!(
                "skipped {app}: {count} windows open, close all but one to record it"
            ))?;
        }
        if recording.preset.rules.is_empty() {
            return Err(MadoError::WindowNotFound(
                "no application with exactly one window to record".to_string(),
            ));
        }
        if find_preset(&self.config.presets, &args.name).is_some() {
            self.printer.warning(&format!(
                "a preset named \"{}\" already exists in {}",
                args.name,
                self.config_path.display()
            ))?;
        }
        if let Some(description) = args.description {
            recording.preset = recording.preset.with_description(description);
        }

        let snippet = presets_to_toml(std::slice::from_ref(&recording.preset))?;
        Ok(self.printer.recording(&snippet, &recording.skipped)?)
    }

    fn criteria(&self, filter: &FilterArgs) -> Result<FilterCriteria, MadoError> {
        Ok(FilterCriteria {
            app: non_blank(filter.app.as_deref()),
            screen: non_blank(filter.screen.as_deref()),
            ignore_apps: self.config.ignore_apps.clone(),
            desktop: desktop_filter(filter.desktop)?,
        })
    }
}

/// Empty or whitespace-only filter values count as unset
fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).map(str::to_string)
}

fn desktop_filter(value: Option<i64>) -> Result<Option<NonZeroU32>, MadoError> {
    match value {
        None => Ok(None),
        Some(value) => u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Some)
            .ok_or_else(|| {
                MadoError::InvalidArgument(
                    "invalid --desktop value: must be a positive integer".to_string(),
                )
            }),
    }
}

fn unknown_preset(name: &str) -> MadoError {
    MadoError::InvalidArgument(format!("unknown preset \"{name}\""))
}

/// Run provider work on the blocking pool. Once the deadline plus a short
/// grace period passes without an answer the command fails with a timeout.
async fn run_blocking<T, F>(ctx: &OperationContext, work: F) -> Result<T, MadoError>
where
    F: FnOnce(OperationContext) -> Result<T, MadoError> + Send + 'static,
    T: Send + 'static,
{
    let task_ctx = ctx.clone();
    let handle = tokio::task::spawn_blocking(move || work(task_ctx));

    let joined = match ctx.remaining() {
        Some(remaining) => tokio::time::timeout(remaining + WATCHDOG_GRACE, handle)
            .await
            .map_err(|_| MadoError::Timeout)?,
        None => handle.await,
    };
    joined.map_err(|err| MadoError::Provider(format!("worker task failed: {err}")))?
}

/// Cancel the context on Ctrl+C (and SIGTERM on unix)
fn watch_interrupt(handle: CancelHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        res = tokio::signal::ctrl_c() => {
                            if let Err(e) = res {
                                warn!("Failed to listen for Ctrl+C: {}", e);
                                return;
                            }
                            info!("Received SIGINT (Ctrl+C)");
                        }
                        _ = sigterm.recv() => info!("Received SIGTERM"),
                    }
                }
                Err(e) => {
                    warn!("Failed to listen for SIGTERM: {}", e);
                    if tokio::signal::ctrl_c().await.is_err() {
                        return;
                    }
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                return;
            }
            info!("Received Ctrl+C");
        }

        handle.cancel();
    })
}

fn report_error<O: Write, E: Write>(printer: &mut Printer<O, E>, err: &MadoError) {
    debug!(error = %err, code = err.exit_code(), "Command failed");

    let mut report = ErrorReport::new(err.exit_code(), err.to_string());
    match err {
        MadoError::PermissionDenied { remediation, .. } => {
            report = report.with_remediation(remediation.clone());
        }
        MadoError::AmbiguousWindow { candidates, .. } => {
            report = report.with_candidates(candidates.clone());
        }
        _ => {}
    }

    if let Err(e) = printer.error(&report) {
        let _ = writeln!(io::stderr(), "Error: {err} (output failed: {e})");
    }
}
