//! Retag configuration: command-line flags, then environment variables, then defaults

use std::env;
use std::str::FromStr;

use crate::error::CliError;

/// Rows handed to the thread pool at once
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Which rule set writes the tag column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Ruleset {
    /// Per-move tag groups followed by puzzle tags
    #[default]
    Hierarchical,
    /// One flat list of tags per puzzle
    Legacy,
}

impl FromStr for Ruleset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hierarchical" => Ok(Ruleset::Hierarchical),
            "legacy" => Ok(Ruleset::Legacy),
            other => Err(format!("unknown ruleset {other:?}")),
        }
    }
}

/// Values given on the command line; `None` falls through to the environment
#[derive(Debug, Clone, Default)]
pub struct RetagOverrides {
    pub threads: Option<usize>,
    pub chunk_size: Option<usize>,
    pub ruleset: Option<Ruleset>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetagConfig {
    /// Worker threads in the tagging pool
    pub threads: usize,

    /// Rows per parallel batch
    pub chunk_size: usize,

    pub ruleset: Ruleset,

    /// Stop after this many data rows
    pub limit: Option<usize>,
}

impl RetagConfig {
    /// Load configuration from the flags and the TAGGER_* environment variables.
    pub fn load(overrides: &RetagOverrides) -> Result<Self, CliError> {
        Self::resolve(overrides, |key| env::var(key).ok())
    }

    fn resolve(overrides: &RetagOverrides, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let threads = match overrides.threads {
            Some(threads) => threads,
            None => parse_var(&lookup, "TAGGER_THREADS")?.unwrap_or_else(num_cpus::get),
        };
        let chunk_size = match overrides.chunk_size {
            Some(size) => size,
            None => parse_var(&lookup, "TAGGER_CHUNK_SIZE")?.unwrap_or(DEFAULT_CHUNK_SIZE),
        };
        let ruleset = match overrides.ruleset {
            Some(ruleset) => ruleset,
            None => parse_var(&lookup, "TAGGER_RULESET")?.unwrap_or_default(),
        };
        let limit = match overrides.limit {
            Some(limit) => Some(limit),
            None => parse_var(&lookup, "TAGGER_LIMIT")?,
        };

        if threads == 0 {
            return Err(CliError::Config("thread count must be at least 1"));
        }
        if chunk_size == 0 {
            return Err(CliError::Config("chunk size must be at least 1"));
        }

        Ok(Self {
            threads,
            chunk_size,
            ruleset,
            limit,
        })
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, CliError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CliError::InvalidEnv { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn resolve(overrides: &RetagOverrides, vars: &[(&str, &str)]) -> Result<RetagConfig, CliError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        RetagConfig::resolve(overrides, |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = resolve(&RetagOverrides::default(), &[]).unwrap();
        assert_eq!(config.threads, num_cpus::get());
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.ruleset, Ruleset::Hierarchical);
        assert_eq!(config.limit, None);
    }

    #[test]
    fn test_env_over_defaults() {
        let config = resolve(
            &RetagOverrides::default(),
            &[
                ("TAGGER_THREADS", "3"),
                ("TAGGER_CHUNK_SIZE", "64"),
                ("TAGGER_RULESET", "legacy"),
                ("TAGGER_LIMIT", "1000"),
            ],
        )
        .unwrap();
        assert_eq!(
            config,
            RetagConfig {
                threads: 3,
                chunk_size: 64,
                ruleset: Ruleset::Legacy,
                limit: Some(1000),
            }
        );
    }

    #[test]
    fn test_flags_over_env() {
        let overrides = RetagOverrides {
            threads: Some(8),
            ruleset: Some(Ruleset::Hierarchical),
            ..Default::default()
        };
        let config = resolve(&overrides, &[("TAGGER_THREADS", "3"), ("TAGGER_RULESET", "legacy")]).unwrap();
        assert_eq!(config.threads, 8);
        assert_eq!(config.ruleset, Ruleset::Hierarchical);
    }

    #[test]
    fn test_invalid_env_value() {
        let err = resolve(&RetagOverrides::default(), &[("TAGGER_CHUNK_SIZE", "lots")]).unwrap_err();
        assert!(matches!(err, CliError::InvalidEnv { var: "TAGGER_CHUNK_SIZE", .. }));

        let err = resolve(&RetagOverrides::default(), &[("TAGGER_RULESET", "fancy")]).unwrap_err();
        assert!(matches!(err, CliError::InvalidEnv { var: "TAGGER_RULESET", .. }));
    }

    #[test]
    fn test_zero_threads_rejected() {
        let overrides = RetagOverrides {
            threads: Some(0),
            ..Default::default()
        };
        assert!(matches!(resolve(&overrides, &[]), Err(CliError::Config(_))));
    }
}
