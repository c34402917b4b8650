//! Executes a resolved preset against the window provider.
//!
//! Rules run one at a time in declaration order, each as a move followed by a
//! resize. A failing rule never stops the plan; only an expired or cancelled
//! context does, and then every rule not yet finished is reported as
//! cancelled. Nothing already applied is rolled back.

use crate::context::{Interruption, OperationContext};
use crate::macos::provider::{ProviderError, WindowProvider};
use crate::models::plan::{ApplyPlan, PlannedRule, Resolution};
use crate::models::preset::{Position, Preset, Size};
use crate::models::report::{ApplyReport, RuleFailure, RuleOutcome, RuleReport, Step};
use crate::models::window::WindowRef;
use crate::services::preset_resolver::resolve;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct LayoutOrchestrator {
    provider: Arc<dyn WindowProvider>,
}

impl LayoutOrchestrator {
    pub fn new(provider: Arc<dyn WindowProvider>) -> Self {
        Self { provider }
    }

    /// List the live inventory, resolve `preset` against it and apply the plan.
    /// Only a failure to list windows is returned as an error.
    pub fn run_preset(
        &self,
        ctx: &OperationContext,
        preset: &Preset,
    ) -> Result<ApplyReport, ProviderError> {
        let inventory = self.provider.list_windows(ctx)?;
        let plan = resolve(preset, &inventory);
        Ok(self.apply(ctx, &plan))
    }

    /// Execute every rule of `plan` and report one outcome per rule
    #[instrument(skip_all, fields(preset = %plan.preset))]
    pub fn apply(&self, ctx: &OperationContext, plan: &ApplyPlan) -> ApplyReport {
        info!(rules = plan.rules.len(), "Applying preset");

        let mut interrupted: Option<Interruption> = None;
        let mut rules = Vec::with_capacity(plan.rules.len());

        for planned in &plan.rules {
            let outcome = match interrupted.or_else(|| ctx.check().err()) {
                Some(reason) => RuleOutcome::cancelled(reason),
                None => self.execute(ctx, planned),
            };

            if let RuleOutcome::Cancelled { reason, .. } = outcome {
                if interrupted.is_none() {
                    warn!(app = %planned.rule.app, %reason, "Preset interrupted, skipping remaining rules");
                }
                interrupted = Some(reason);
            }

            rules.push(RuleReport {
                app: planned.rule.app.clone(),
                position: planned.rule.position,
                size: planned.rule.size,
                outcome,
            });
        }

        let report = ApplyReport {
            preset: plan.preset.clone(),
            rules,
        };
        info!(
            applied = report.applied_count(),
            failed = report.failed_count(),
            "Preset finished"
        );
        report
    }

    /// Move and/or resize a single window.
    ///
    /// Returns the failed steps (empty on success). A move failure does not
    /// prevent the resize; an interruption stops immediately.
    pub fn place(
        &self,
        ctx: &OperationContext,
        window: &WindowRef,
        position: Option<Position>,
        size: Option<Size>,
    ) -> Result<Vec<RuleFailure>, Interruption> {
        let mut failures = Vec::new();
        self.place_into(ctx, window, position, size, &mut failures)?;
        Ok(failures)
    }

    fn place_into(
        &self,
        ctx: &OperationContext,
        window: &WindowRef,
        position: Option<Position>,
        size: Option<Size>,
        failures: &mut Vec<RuleFailure>,
    ) -> Result<(), Interruption> {
        if let Some(position) = position {
            ctx.check()?;
            let result =
                self.provider
                    .move_window(ctx, window.pid, &window.title, position.x, position.y);
            record(result, window, Step::Move, failures)?;
        }

        if let Some(size) = size {
            ctx.check()?;
            let result = self.provider.resize_window(
                ctx,
                window.pid,
                &window.title,
                size.width,
                size.height,
            );
            record(result, window, Step::Resize, failures)?;
        }

        Ok(())
    }

    fn execute(&self, ctx: &OperationContext, planned: &PlannedRule) -> RuleOutcome {
        let rule = &planned.rule;
        match &planned.resolution {
            Resolution::NoMatch => {
                warn!(app = %rule.app, "No window matches preset rule");
                RuleOutcome::NoMatch
            }
            Resolution::Ambiguous { candidates } => {
                warn!(
                    app = %rule.app,
                    candidates = candidates.len(),
                    "Several windows match preset rule, not guessing"
                );
                RuleOutcome::AmbiguousMatch {
                    candidates: candidates.clone(),
                }
            }
            Resolution::Matched { window } => {
                let mut failures = Vec::new();
                let placed = self.place_into(
                    ctx,
                    window,
                    Some(rule.position),
                    Some(rule.size),
                    &mut failures,
                );
                match placed {
                    Err(reason) => RuleOutcome::Cancelled { reason, failures },
                    Ok(()) if failures.is_empty() => {
                        debug!(%window, position = %rule.position, size = %rule.size, "Placed window");
                        RuleOutcome::Applied {
                            window: window.clone(),
                        }
                    }
                    Ok(()) => RuleOutcome::ProviderError {
                        window: window.clone(),
                        failures,
                    },
                }
            }
        }
    }
}

fn record(
    result: Result<(), ProviderError>,
    window: &WindowRef,
    step: Step,
    failures: &mut Vec<RuleFailure>,
) -> Result<(), Interruption> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            if let Some(reason) = err.interruption() {
                return Err(reason);
            }
            warn!(%window, %step, error = %err, "Provider call failed");
            failures.push(RuleFailure {
                app: window.app_name.clone(),
                step,
                source: err,
            });
            Ok(())
        }
    }
}
