//! Replayable navigation scenarios.
//!
//! A scenario is a TOML file describing a tab's starting URL, the elements
//! present on the page, and a timeline of user and script actions:
//!
//! ```toml
//! initial_url = "/"
//!
//! [[elements]]
//! id = "comments"
//! top = 1200.0
//!
//! [[steps]]
//! at_ms = 0
//! action = { type = "click", href = "/browse" }
//!
//! [[steps]]
//! at_ms = 400
//! action = { type = "back" }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::NavigationTab;
use crate::back_button::BackButtonAction;
use crate::bus::PushDecision;
use crate::clock::{ManualScheduler, Scheduler, SchedulerError, TokioScheduler};
use crate::config::NavigationConfig;
use crate::diagnostics::{DuplicateAnalysis, HistoryReport};
use crate::navigate::{NavigateOptions, NavigateOutcome};
use crate::scroll::{MemoryViewport, ScrollOutcome};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse scenario file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid scenario: {message}")]
    ValidationError { message: String },
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_initial_url")]
    pub initial_url: String,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Time allowed after the last step for timers to fire (default: 1000).
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

/// An element placed on the page before the replay starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    #[serde(default)]
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Offset from the start of the replay.
    pub at_ms: u64,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// The user clicks an in-app link.
    Click { href: String },
    /// App code calls the safe-navigate function.
    Navigate {
        to: String,
        #[serde(default)]
        replace: bool,
    },
    /// A render-time redirect effect fires.
    Redirect { to: String },
    Back,
    Forward,
    Go { delta: i32 },
    /// A third-party script calls `pushState` directly.
    ThirdPartyPush { url: String },
    HardwareBack,
    /// Nothing happens; only time passes.
    Wait,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Click { href } => write!(f, "click {href}"),
            Action::Navigate { to, replace: true } => write!(f, "navigate {to} (replace)"),
            Action::Navigate { to, .. } => write!(f, "navigate {to}"),
            Action::Redirect { to } => write!(f, "redirect {to}"),
            Action::Back => f.write_str("back"),
            Action::Forward => f.write_str("forward"),
            Action::Go { delta } => write!(f, "go {delta}"),
            Action::ThirdPartyPush { url } => write!(f, "third-party push {url}"),
            Action::HardwareBack => f.write_str("hardware back"),
            Action::Wait => f.write_str("wait"),
        }
    }
}

/// What a single step did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutcome {
    Clicked,
    Navigated { outcome: NavigateOutcome },
    Traversed { moved: bool },
    Pushed { decision: PushDecision },
    BackButton { action: BackButtonAction },
    Waited,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub at_ms: u64,
    pub action: String,
    pub outcome: StepOutcome,
    /// Router location right after the step.
    pub location: String,
    pub history_length: usize,
    pub back_navigation_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepRecord>,
    pub history: Vec<String>,
    pub report: HistoryReport,
    pub analysis: DuplicateAnalysis,
    pub scroll: Option<ScrollOutcome>,
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(
                f,
                "{:>6}ms  {:<32} -> {:<20} len={}{}",
                step.at_ms,
                step.action,
                step.location,
                step.history_length,
                if step.back_navigation_active { "  [back]" } else { "" }
            )?;
        }
        writeln!(f)?;
        writeln!(f, "History ({} entries, at {}):", self.report.length, self.report.index)?;
        for (i, key) in self.history.iter().enumerate() {
            let marker = if i == self.report.index { ">" } else { " " };
            writeln!(f, "  {marker} {i}: {key}")?;
        }
        writeln!(
            f,
            "Unique URLs: {}/{} ({:?})",
            self.analysis.unique, self.analysis.total, self.analysis.verdict
        )?;
        match &self.scroll {
            Some(outcome) => writeln!(f, "Last scroll: {outcome:?}"),
            None => writeln!(f, "Last scroll: none"),
        }
    }
}

fn default_initial_url() -> String {
    "/".to_string()
}

fn default_settle_ms() -> u64 {
    1000
}

/// Latest step offset and longest settle time a scenario may ask for (24h).
pub const MAX_SCENARIO_MS: u64 = 86_400_000;

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScenarioError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let scenario: Scenario =
            toml::from_str(&content).map_err(|e| ScenarioError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        let invalid = |message: String| ScenarioError::ValidationError { message };

        if self.initial_url.trim().is_empty() {
            return Err(invalid("initial_url must not be empty".into()));
        }
        if self.settle_ms > MAX_SCENARIO_MS {
            return Err(invalid(format!(
                "settle_ms must be at most {MAX_SCENARIO_MS} (got {})",
                self.settle_ms
            )));
        }
        if let Some(step) = self.steps.iter().find(|s| s.at_ms > MAX_SCENARIO_MS) {
            return Err(invalid(format!(
                "at_ms must be at most {MAX_SCENARIO_MS} (got {})",
                step.at_ms
            )));
        }
        if let Some(pair) = self.steps.windows(2).find(|w| w[1].at_ms < w[0].at_ms) {
            return Err(invalid(format!(
                "steps must be sorted by at_ms ({} comes after {})",
                pair[1].at_ms, pair[0].at_ms
            )));
        }
        for (i, step) in self.steps.iter().enumerate() {
            let path = match &step.action {
                Action::Click { href } => Some(href),
                Action::Navigate { to, .. } | Action::Redirect { to } => Some(to),
                Action::ThirdPartyPush { url } => Some(url),
                _ => None,
            };
            if path.is_some_and(|p| p.trim().is_empty()) {
                return Err(invalid(format!("step {i} ({}) has an empty path", step.action)));
            }
        }
        Ok(())
    }

    /// Build a tab and replay the scenario on it in virtual time.
    pub fn replay(&self, config: NavigationConfig) -> ReplayReport {
        let scheduler = ManualScheduler::new();
        let viewport = self.viewport();
        let tab = NavigationTab::bootstrap(
            config,
            Arc::new(scheduler.clone()),
            &self.initial_url,
            Arc::new(viewport),
        );
        self.run(&tab, &scheduler)
    }

    /// Replay on an existing tab, moving `scheduler` forward between steps.
    pub fn run(&self, tab: &NavigationTab, scheduler: &ManualScheduler) -> ReplayReport {
        let start = scheduler.now();
        let mut records = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            scheduler.advance_to(start + Duration::from_millis(step.at_ms));
            records.push(apply(tab, step));
        }
        scheduler.advance(Duration::from_millis(self.settle_ms));

        report(tab, records)
    }

    /// Replay against the tokio clock. Steps fire at their wall-clock offsets.
    pub async fn run_realtime(
        &self,
        config: NavigationConfig,
    ) -> Result<ReplayReport, ScenarioError> {
        self.validate()?;
        let scheduler = TokioScheduler::from_current()?;
        let tab = NavigationTab::bootstrap(
            config,
            Arc::new(scheduler),
            &self.initial_url,
            Arc::new(self.viewport()),
        );

        let start = tokio::time::Instant::now();
        let mut records = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            tokio::time::sleep_until(start + Duration::from_millis(step.at_ms)).await;
            records.push(apply(&tab, step));
        }
        tokio::time::sleep(Duration::from_millis(self.settle_ms)).await;

        Ok(report(&tab, records))
    }

    fn viewport(&self) -> MemoryViewport {
        let viewport = MemoryViewport::new();
        for element in &self.elements {
            viewport.insert_element(element.id.clone(), element.top);
        }
        viewport
    }
}

fn apply(tab: &NavigationTab, step: &Step) -> StepRecord {
    let outcome = match &step.action {
        Action::Click { href } => {
            tab.click_link(href);
            StepOutcome::Clicked
        }
        Action::Navigate { to, replace } => {
            let options = NavigateOptions { replace: *replace };
            let outcome = tab.use_safe_navigate().navigate(to.as_str(), options);
            StepOutcome::Navigated { outcome }
        }
        Action::Redirect { to } => StepOutcome::Navigated {
            outcome: tab.use_safe_navigate().redirect(to),
        },
        Action::Back => traverse(tab, |tab| tab.press_back()),
        Action::Forward => traverse(tab, |tab| tab.press_forward()),
        Action::Go { delta } => {
            let outcome = tab.use_safe_navigate().navigate(*delta, NavigateOptions::default());
            StepOutcome::Navigated { outcome }
        }
        Action::ThirdPartyPush { url } => StepOutcome::Pushed {
            decision: tab.third_party_push(url),
        },
        Action::HardwareBack => StepOutcome::BackButton {
            action: tab.hardware_back(),
        },
        Action::Wait => StepOutcome::Waited,
    };

    tracing::debug!(at_ms = step.at_ms, action = %step.action, ?outcome, "Scenario step");

    StepRecord {
        at_ms: step.at_ms,
        action: step.action.to_string(),
        outcome,
        location: tab.location().key().to_string(),
        history_length: tab.history_length(),
        back_navigation_active: tab.is_back_navigation_active(),
    }
}

fn traverse(tab: &NavigationTab, press: impl Fn(&NavigationTab)) -> StepOutcome {
    let before = tab.session().index();
    press(tab);
    StepOutcome::Traversed {
        moved: tab.session().index() != before,
    }
}

fn report(tab: &NavigationTab, steps: Vec<StepRecord>) -> ReplayReport {
    ReplayReport {
        steps,
        history: tab
            .session()
            .entries()
            .iter()
            .map(|entry| entry.location.key().to_string())
            .collect(),
        report: tab.history_report(),
        analysis: tab.duplicate_analysis(),
        scroll: tab.scroll_outcome(),
    }
}
