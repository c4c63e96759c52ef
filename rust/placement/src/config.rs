// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement configuration loaded from environment variables.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How created openings are grouped into transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// One transaction for ducts, one for pipes.
    #[default]
    PerStream,
    /// One transaction for the whole run.
    SingleRun,
}

impl FromStr for CommitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_stream" | "per-stream" | "stream" => Ok(CommitPolicy::PerStream),
            "single_run" | "single-run" | "run" => Ok(CommitPolicy::SingleRun),
            other => Err(format!("unknown commit policy: {other}")),
        }
    }
}

/// What to do when the duct or pipe stream has no elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyStreamPolicy {
    /// Warn and continue with the other stream.
    #[default]
    Skip,
    /// Abort the run before any mutation.
    Abort,
}

impl FromStr for EmptyStreamPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(EmptyStreamPolicy::Skip),
            "abort" => Ok(EmptyStreamPolicy::Abort),
            other => Err(format!("unknown empty stream policy: {other}")),
        }
    }
}

/// Placement configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Family name of the opening template.
    pub template_family: String,
    /// Template parameter receiving the opening width.
    pub width_parameter: String,
    /// Template parameter receiving the opening height.
    pub height_parameter: String,
    /// Substring identifying the systems document among open documents.
    pub systems_title_pattern: String,
    /// Transaction name shown in the host's undo history.
    pub transaction_name: String,
    pub commit_policy: CommitPolicy,
    pub empty_stream_policy: EmptyStreamPolicy,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            template_family: "Opening".into(),
            width_parameter: "Width".into(),
            height_parameter: "Height".into(),
            systems_title_pattern: "_Systems".into(),
            transaction_name: "Place openings".into(),
            commit_policy: CommitPolicy::default(),
            empty_stream_policy: EmptyStreamPolicy::default(),
        }
    }
}

impl PlacementConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            template_family: lookup("SLEEVE_TEMPLATE_FAMILY").unwrap_or(defaults.template_family),
            width_parameter: lookup("SLEEVE_WIDTH_PARAMETER").unwrap_or(defaults.width_parameter),
            height_parameter: lookup("SLEEVE_HEIGHT_PARAMETER")
                .unwrap_or(defaults.height_parameter),
            systems_title_pattern: lookup("SLEEVE_SYSTEMS_PATTERN")
                .unwrap_or(defaults.systems_title_pattern),
            transaction_name: lookup("SLEEVE_TRANSACTION_NAME")
                .unwrap_or(defaults.transaction_name),
            commit_policy: lookup("SLEEVE_COMMIT_POLICY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.commit_policy),
            empty_stream_policy: lookup("SLEEVE_EMPTY_STREAM_POLICY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.empty_stream_policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[test]
    fn defaults() {
        let config = PlacementConfig::default();
        assert_eq!(config.template_family, "Opening");
        assert_eq!(config.width_parameter, "Width");
        assert_eq!(config.height_parameter, "Height");
        assert_eq!(config.commit_policy, CommitPolicy::PerStream);
        assert_eq!(config.empty_stream_policy, EmptyStreamPolicy::Skip);
    }

    #[test]
    fn lookup_overrides_and_falls_back() {
        let vars: FxHashMap<&str, &str> = [
            ("SLEEVE_TEMPLATE_FAMILY", "Sleeve_Round"),
            ("SLEEVE_COMMIT_POLICY", "single-run"),
            ("SLEEVE_EMPTY_STREAM_POLICY", "bogus"),
        ]
        .into_iter()
        .collect();

        let config = PlacementConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.template_family, "Sleeve_Round");
        assert_eq!(config.commit_policy, CommitPolicy::SingleRun);
        // unparsable values keep the default
        assert_eq!(config.empty_stream_policy, EmptyStreamPolicy::Skip);
        assert_eq!(config.width_parameter, "Width");
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("Abort".parse::<EmptyStreamPolicy>(), Ok(EmptyStreamPolicy::Abort));
        assert_eq!("per_stream".parse::<CommitPolicy>(), Ok(CommitPolicy::PerStream));
        assert!("sometimes".parse::<CommitPolicy>().is_err());
    }
}
