//! Survey configuration and gateway factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sjt_core::parser::{QuestionStore, DEFAULT_OPTION_LETTERS};
use sjt_core::submission::ColumnLayout;
use sjt_core::traits::PersistenceGateway;

use crate::demo::DemoGateway;
use crate::sheets::SheetsGateway;

/// Where submissions go.
///
/// `Debug` masks the access token.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GatewayConfig {
    Sheets {
        spreadsheet_id: String,
        #[serde(default)]
        access_token: String,
        /// A1-notation range to append after (default "Sheet1").
        #[serde(default)]
        range: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
    },
    Demo,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayConfig::Sheets {
                spreadsheet_id,
                access_token: _,
                range,
                base_url,
            } => f
                .debug_struct("Sheets")
                .field("spreadsheet_id", spreadsheet_id)
                .field("access_token", &"***")
                .field("range", range)
                .field("base_url", base_url)
                .finish(),
            GatewayConfig::Demo => f.write_str("Demo"),
        }
    }
}

/// Top-level survey configuration, fixed for the life of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Survey title shown to respondents.
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Path to the question file. Relative paths are resolved against the
    /// directory of the config file they came from.
    #[serde(default = "default_questions_file")]
    pub questions_file: PathBuf,
    /// Option letters every question must define.
    #[serde(default = "default_option_letters")]
    pub option_letters: Vec<String>,
    /// Fixed answers offered for the experience field; free text when empty.
    #[serde(default)]
    pub experience_choices: Vec<String>,
    /// Column order of the target sheet.
    #[serde(default)]
    pub layout: ColumnLayout,
    /// Destination; demo mode when absent.
    #[serde(default)]
    pub gateway: Option<GatewayConfig>,
}

fn default_title() -> String {
    "Situational Judgement Survey".to_string()
}
fn default_questions_file() -> PathBuf {
    PathBuf::from("sjt_questions.json")
}
fn default_option_letters() -> Vec<String> {
    DEFAULT_OPTION_LETTERS.iter().map(|l| l.to_string()).collect()
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: String::new(),
            questions_file: default_questions_file(),
            option_letters: default_option_letters(),
            experience_choices: Vec::new(),
            layout: ColumnLayout::default(),
            gateway: None,
        }
    }
}

impl SurveyConfig {
    /// The question store this configuration points at.
    pub fn question_store(&self) -> QuestionStore {
        QuestionStore::new(&self.questions_file).with_required_letters(self.option_letters.clone())
    }

    /// Reject configurations that would produce misaligned or unusable rows.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.option_letters.is_empty(),
            "option_letters must not be empty"
        );
        let problems = self.layout.problems();
        anyhow::ensure!(
            problems.is_empty(),
            "invalid layout: {}",
            problems.join("; ")
        );
        if let Some(GatewayConfig::Sheets {
            spreadsheet_id,
            access_token,
            ..
        }) = &self.gateway
        {
            anyhow::ensure!(
                !spreadsheet_id.trim().is_empty(),
                "sheets gateway: spreadsheet_id is empty"
            );
            anyhow::ensure!(
                !access_token.trim().is_empty(),
                "sheets gateway: access_token is empty (set it in the config or SJT_SHEETS_TOKEN)"
            );
        }
        Ok(())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are inserted verbatim and never scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_gateway_config(config: &GatewayConfig) -> GatewayConfig {
    match config {
        GatewayConfig::Sheets {
            spreadsheet_id,
            access_token,
            range,
            base_url,
        } => GatewayConfig::Sheets {
            spreadsheet_id: resolve_env_vars(spreadsheet_id),
            access_token: resolve_env_vars(access_token),
            range: range.as_ref().map(|r| resolve_env_vars(r)),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        GatewayConfig::Demo => GatewayConfig::Demo,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `sjt.toml` in the current directory
/// 2. `~/.config/sjt/config.toml`
///
/// Environment variable override: `SJT_SHEETS_TOKEN`.
pub fn load_config() -> Result<SurveyConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SurveyConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("sjt.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let mut config = toml::from_str::<SurveyConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            if config.questions_file.is_relative() {
                if let Some(dir) = path.parent() {
                    config.questions_file = dir.join(&config.questions_file);
                }
            }
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => SurveyConfig::default(),
    };

    config.gateway = config.gateway.as_ref().map(resolve_gateway_config);

    if let Ok(token) = std::env::var("SJT_SHEETS_TOKEN") {
        if let Some(GatewayConfig::Sheets { access_token, .. }) = config.gateway.as_mut() {
            *access_token = token;
        }
    }

    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("sjt"))
}

/// Create the gateway a configuration asks for; demo mode when none is set.
pub fn create_gateway(config: Option<&GatewayConfig>) -> Result<Box<dyn PersistenceGateway>> {
    match config {
        Some(GatewayConfig::Sheets {
            spreadsheet_id,
            access_token,
            range,
            base_url,
        }) => Ok(Box::new(SheetsGateway::new(
            access_token,
            spreadsheet_id,
            range.clone(),
            base_url.clone(),
        )?)),
        Some(GatewayConfig::Demo) => Ok(Box::new(DemoGateway)),
        None => {
            tracing::warn!("no gateway configured, running in demo mode: submissions are not saved");
            Ok(Box::new(DemoGateway))
        }
    }
}
