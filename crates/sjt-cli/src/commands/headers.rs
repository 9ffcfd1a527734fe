//! The `sjt headers` command.

use std::path::PathBuf;

use anyhow::Result;

use super::load_survey;

pub fn execute(config_path: Option<PathBuf>, questions_path: Option<PathBuf>) -> Result<()> {
    let (config, questions) = load_survey(config_path, questions_path)?;
    println!("{}", config.layout.headers(&questions).join("\t"));
    Ok(())
}
