//! Lifecycle event definitions and metadata.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The nine release lifecycle points a command can be bound to.
///
/// Variants are listed in the order a release host fires them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleEvent {
    #[value(name = "verifyConditions", alias = "verify-conditions")]
    VerifyConditions,
    #[value(name = "analyzeCommits", alias = "analyze-commits")]
    AnalyzeCommits,
    #[value(name = "verifyRelease", alias = "verify-release")]
    VerifyRelease,
    #[value(name = "generateNotes", alias = "generate-notes")]
    GenerateNotes,
    #[value(name = "prepare")]
    Prepare,
    #[value(name = "publish")]
    Publish,
    #[value(name = "addChannel", alias = "add-channel")]
    AddChannel,
    #[value(name = "success")]
    Success,
    #[value(name = "fail")]
    Fail,
}

/// How a lifecycle event treats the outcome of its command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventClass {
    /// Command failure aborts the release.
    Gate,
    /// Trimmed stdout is the result.
    Text,
    /// Only the side effect matters; stdout is discarded.
    SideEffect,
    /// Stdout optionally carries a JSON value for the host.
    Structured,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 9] = [
        LifecycleEvent::VerifyConditions,
        LifecycleEvent::AnalyzeCommits,
        LifecycleEvent::VerifyRelease,
        LifecycleEvent::GenerateNotes,
        LifecycleEvent::Prepare,
        LifecycleEvent::Publish,
        LifecycleEvent::AddChannel,
        LifecycleEvent::Success,
        LifecycleEvent::Fail,
    ];

    /// Name the release host uses for this step.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerifyConditions => "verifyConditions",
            Self::AnalyzeCommits => "analyzeCommits",
            Self::VerifyRelease => "verifyRelease",
            Self::GenerateNotes => "generateNotes",
            Self::Prepare => "prepare",
            Self::Publish => "publish",
            Self::AddChannel => "addChannel",
            Self::Success => "success",
            Self::Fail => "fail",
        }
    }

    /// Configuration key holding the event-specific command template.
    ///
    /// ```toml
    /// verifyConditionsCmd = "./scripts/check.sh"
    /// ```
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::VerifyConditions => "verifyConditionsCmd",
            Self::AnalyzeCommits => "analyzeCommitsCmd",
            Self::VerifyRelease => "verifyReleaseCmd",
            Self::GenerateNotes => "generateNotesCmd",
            Self::Prepare => "prepareCmd",
            Self::Publish => "publishCmd",
            Self::AddChannel => "addChannelCmd",
            Self::Success => "successCmd",
            Self::Fail => "failCmd",
        }
    }

    pub fn class(&self) -> EventClass {
        match self {
            Self::VerifyConditions | Self::VerifyRelease => EventClass::Gate,
            Self::AnalyzeCommits | Self::GenerateNotes => EventClass::Text,
            Self::Prepare | Self::Success | Self::Fail => EventClass::SideEffect,
            Self::Publish | Self::AddChannel => EventClass::Structured,
        }
    }

    /// Whether a failing command for this event must stop the release.
    ///
    /// `success` and `fail` run after the release decision is made, so their
    /// failures are reported but left to the host to act on.
    pub fn failure_is_fatal(&self) -> bool {
        !matches!(self, Self::Success | Self::Fail)
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s || event.config_key() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|e| e.as_str()).collect();
                format!(
                    "Unknown lifecycle event '{s}'. Valid values: {}",
                    names.join(", ")
                )
            })
    }
}
