use anyhow::Result;
use commandsuite::SuiteConfig;
use std::path::PathBuf;

pub fn run(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(SuiteConfig::project_config_path);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    SuiteConfig::create_default_config(&path)?;
    println!("✅ Wrote default config to {}", path.display());
    Ok(())
}
