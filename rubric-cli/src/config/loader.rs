use super::types::{
    EvaluationConfig, RawEvaluationConfig, RawMetricsConfig, RawRubricConfig, RubricConfig,
    SamplingConfig,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use rubric_evals::MetricOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<RubricConfig> {
        let mut raw = RawRubricConfig::default();

        // Layer 1: User config
        if let Some(user_path) = Self::user_config_path()
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        // Convert to final config with defaults applied
        Ok(Self::finalize(raw))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rubric").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with RUBRIC_PROJECT_CONFIG_DIR env var (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("RUBRIC_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".rubric/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawRubricConfig> {
        debug!(path = %path.display(), "loading config layer");
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawRubricConfig, overlay: RawRubricConfig) -> RawRubricConfig {
        RawRubricConfig {
            evaluation: RawEvaluationConfig {
                metrics: overlay.evaluation.metrics.or(base.evaluation.metrics),
                correct_threshold: overlay
                    .evaluation
                    .correct_threshold
                    .or(base.evaluation.correct_threshold),
                parallel: overlay.evaluation.parallel.or(base.evaluation.parallel),
                model: overlay.evaluation.model.or(base.evaluation.model),
            },
            sampling: SamplingConfig {
                seed: overlay.sampling.seed.or(base.sampling.seed),
            },
            metrics: RawMetricsConfig {
                exact_match: overlay.metrics.exact_match.or(base.metrics.exact_match),
                bleu: overlay.metrics.bleu.or(base.metrics.bleu),
                rouge: overlay.metrics.rouge.or(base.metrics.rouge),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawRubricConfig) -> RubricConfig {
        let defaults = EvaluationConfig::default();
        RubricConfig {
            evaluation: EvaluationConfig {
                metrics: raw.evaluation.metrics.unwrap_or(defaults.metrics),
                correct_threshold: raw
                    .evaluation
                    .correct_threshold
                    .unwrap_or(defaults.correct_threshold),
                parallel: raw.evaluation.parallel.unwrap_or(defaults.parallel),
                model: raw.evaluation.model,
            },
            sampling: raw.sampling,
            metrics: MetricOptions {
                exact_match: raw.metrics.exact_match.unwrap_or_default(),
                bleu: raw.metrics.bleu.unwrap_or_default(),
                rouge: raw.metrics.rouge.unwrap_or_default(),
            },
        }
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<RubricConfig> {
        if path.exists() {
            Ok(Self::finalize(Self::read_raw(path)?))
        } else {
            Ok(RubricConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rubric_evals::metrics::{RougeVariant, Smoothing};
    use std::io::Write;
    use tempfile::TempDir;

    fn raw(toml_str: &str) -> RawRubricConfig {
        toml::from_str(toml_str).unwrap()
    }

    // ==================== Merge Tests ====================

    #[test]
    fn test_merge_overlay_overrides_set_values() {
        let base = raw(r#"
[evaluation]
metrics = ["exact_match"]
model = "base-model"
"#);
        let overlay = raw(r#"
[evaluation]
metrics = ["bleu", "rouge"]
"#);

        let merged = ConfigLoader::merge_raw(base, overlay);

        assert_eq!(
            merged.evaluation.metrics,
            Some(vec!["bleu".to_string(), "rouge".to_string()])
        );
        assert_eq!(merged.evaluation.model, Some("base-model".to_string()));
    }

    #[test]
    fn test_merge_keeps_base_when_overlay_unset() {
        let base = raw(r#"
[sampling]
seed = 7

[metrics.bleu]
smoothing = "add_k"
"#);

        let merged = ConfigLoader::merge_raw(base, RawRubricConfig::default());

        assert_eq!(merged.sampling.seed, Some(7));
        assert_eq!(merged.metrics.bleu.map(|b| b.smoothing), Some(Smoothing::AddK));
    }

    #[test]
    fn test_merge_replaces_whole_metric_tables() {
        let base = raw(r#"
[metrics.bleu]
max_n = 2
smoothing = "add_k"
"#);
        let overlay = raw(r#"
[metrics.bleu]
max_n = 3
"#);

        let merged = ConfigLoader::finalize(ConfigLoader::merge_raw(base, overlay));

        assert_eq!(merged.metrics.bleu.max_n, 3);
        assert_eq!(merged.metrics.bleu.smoothing, Smoothing::None);
    }

    // ==================== Finalize Tests ====================

    #[test]
    fn test_finalize_applies_defaults() {
        let config = ConfigLoader::finalize(RawRubricConfig::default());
        assert_eq!(config, RubricConfig::default());
    }

    #[test]
    fn test_finalize_uses_set_values() {
        let config = ConfigLoader::finalize(raw(r#"
[evaluation]
correct_threshold = 0.5
parallel = true

[metrics.rouge]
variants = ["rouge1"]
"#));

        assert_eq!(config.evaluation.correct_threshold, 0.5);
        assert!(config.evaluation.parallel);
        assert_eq!(config.metrics.rouge.variants, vec![RougeVariant::Rouge1]);
    }

    // ==================== Load Tests ====================

    #[test]
    fn test_load_from_missing_path_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_from_path(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, RubricConfig::default());
    }

    #[test]
    fn test_load_from_path_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[evaluation]\nmodel = \"from-file\"").unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.evaluation.model, Some("from-file".to_string()));
    }

    #[test]
    fn test_load_from_path_reports_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[evaluation\nmodel = ").unwrap();

        let err = ConfigLoader::load_from_path(&path).unwrap_err();

        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn test_project_config_path_default() {
        if std::env::var("RUBRIC_PROJECT_CONFIG_DIR").is_err() {
            assert_eq!(
                ConfigLoader::project_config_path(),
                PathBuf::from(".rubric/config.toml")
            );
        }
    }
}
