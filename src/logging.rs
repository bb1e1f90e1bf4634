use std::fs::OpenOptions;

use anyhow::{Context, Result};

use taskdesk::config::Config;

/// Install the global logger. With a log file configured, output is appended
/// there so the terminal UI keeps the screen to itself.
pub fn init(config: &Config) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&config.log_filter).format_timestamp_secs();

    if let Some(path) = &config.log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    } else {
        builder.target(env_logger::Target::Stderr);
    }

    builder
        .try_init()
        .context("logger already initialized")?;
    Ok(())
}
