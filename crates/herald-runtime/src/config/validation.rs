//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{BotConfig, HeraldConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &HeraldConfig) -> ConfigResult<()> {
    validate_bot_config(&config.bot)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_bot_config(bot: &BotConfig) -> ConfigResult<()> {
    if bot.prefix.is_empty() {
        return Err(ConfigError::validation("Command prefix cannot be empty"));
    }

    if bot.prefix.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "Command prefix cannot contain whitespace: {:?}",
            bot.prefix
        )));
    }

    if let Some(owner_id) = &bot.owner_id
        && owner_id.trim().is_empty()
    {
        return Err(ConfigError::validation("Owner id cannot be empty"));
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "File log output requires logging.file_path",
        ));
    }

    if let Some(target) = logging.filters.keys().find(|target| target.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid log filter target: {target:?}"
        )));
    }

    Ok(())
}
