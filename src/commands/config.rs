//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print one value
//! - `config set`: Set one value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::config::Config;
use crate::controller::ZakenEncoding;
use crate::error::{ArchiefError, Result};

const VALID_KEYS: &[&str] = &[
    "base_url",
    "endpoints.zaken",
    "endpoints.create_list_page",
    "endpoints.no_archive_date_page",
    "auth.session_id",
    "auth.csrf_token",
    "remote_timeout",
    "zaken_encoding",
    "short_review_zaaktypes",
];

fn is_secret(key: &str) -> bool {
    key.starts_with("auth.")
}

fn validate_config_key(key: &str) -> Result<&str> {
    if VALID_KEYS.contains(&key) {
        return Ok(key);
    }
    Err(ArchiefError::Config(format!(
        "invalid config key '{key}'. Valid keys: {}",
        VALID_KEYS.join(", ")
    )))
}

/// Mask a sensitive value by showing only the first 2 and last 2 characters
fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

/// Current value of `key` as stored in the file
fn read_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "base_url" => config.base_url.clone(),
        "endpoints.zaken" => Some(config.endpoints.zaken.clone()),
        "endpoints.create_list_page" => Some(config.endpoints.create_list_page.clone()),
        "endpoints.no_archive_date_page" => Some(config.endpoints.no_archive_date_page.clone()),
        "auth.session_id" => config.auth.session_id.clone(),
        "auth.csrf_token" => config.auth.csrf_token.clone(),
        "remote_timeout" => Some(config.remote_timeout.to_string()),
        "zaken_encoding" => Some(config.zaken_encoding.to_string()),
        "short_review_zaaktypes" => Some(config.short_review_zaaktypes.join(",")),
        _ => None,
    }
}

fn write_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "base_url" => {
            url::Url::parse(value)
                .map_err(|e| ArchiefError::Config(format!("invalid base_url '{value}': {e}")))?;
            config.base_url = Some(value.to_string());
        }
        "endpoints.zaken" => config.endpoints.zaken = value.to_string(),
        "endpoints.create_list_page" => config.endpoints.create_list_page = value.to_string(),
        "endpoints.no_archive_date_page" => {
            config.endpoints.no_archive_date_page = value.to_string()
        }
        "auth.session_id" => config.auth.session_id = Some(value.to_string()),
        "auth.csrf_token" => config.auth.csrf_token = Some(value.to_string()),
        "remote_timeout" => {
            let seconds = value.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                ArchiefError::Config(format!(
                    "invalid value '{value}' for remote_timeout. Expected a positive number of seconds"
                ))
            })?;
            config.remote_timeout = seconds;
        }
        "zaken_encoding" => config.zaken_encoding = value.parse::<ZakenEncoding>()?,
        "short_review_zaaktypes" => {
            config.short_review_zaaktypes = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        _ => return Err(ArchiefError::Config(format!("invalid config key '{key}'"))),
    }
    Ok(())
}

/// Show current configuration
pub fn cmd_config_show(json: bool) -> Result<()> {
    let config = Config::load()?;

    let session_configured = config.session_id().is_some();
    let csrf_configured = config.csrf_token().is_some();

    let json_output = json!({
        "base_url": config.base_url,
        "endpoints": {
            "zaken": config.endpoints.zaken,
            "create_list_page": config.endpoints.create_list_page,
            "no_archive_date_page": config.endpoints.no_archive_date_page,
        },
        "auth": {
            "session_id_configured": session_configured,
            "csrf_token_configured": csrf_configured,
        },
        "remote_timeout": config.remote_timeout,
        "zaken_encoding": config.zaken_encoding.to_string(),
        "short_review_zaaktypes": config.short_review_zaaktypes,
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    match &config.base_url {
        Some(url) => text_output.push_str(&format!("{}: {url}\n", "base_url".cyan())),
        None => text_output.push_str(&format!(
            "{}: {}\n",
            "base_url".cyan(),
            "not configured".dimmed()
        )),
    }

    text_output.push_str(&format!("\n{}:\n", "endpoints".cyan()));
    text_output.push_str(&format!("  zaken: {}\n", config.endpoints.zaken));
    text_output.push_str(&format!(
        "  create_list_page: {}\n",
        config.endpoints.create_list_page
    ));
    text_output.push_str(&format!(
        "  no_archive_date_page: {}\n",
        config.endpoints.no_archive_date_page
    ));

    // Don't show the credentials themselves
    let status = |configured: bool| {
        if configured {
            "configured".green().to_string()
        } else {
            "not configured".dimmed().to_string()
        }
    };
    text_output.push_str(&format!("\n{}:\n", "auth".cyan()));
    text_output.push_str(&format!("  session_id: {}\n", status(session_configured)));
    text_output.push_str(&format!("  csrf_token: {}\n", status(csrf_configured)));

    text_output.push_str(&format!(
        "\n{}: {}s\n",
        "remote_timeout".cyan(),
        config.remote_timeout
    ));
    text_output.push_str(&format!(
        "{}: {}\n",
        "zaken_encoding".cyan(),
        config.zaken_encoding
    ));
    if !config.short_review_zaaktypes.is_empty() {
        text_output.push_str(&format!("{}:\n", "short_review_zaaktypes".cyan()));
        for zaaktype in &config.short_review_zaaktypes {
            text_output.push_str(&format!("  - {zaaktype}\n"));
        }
    }

    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(json)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, json: bool) -> Result<()> {
    validate_config_key(key)?;

    let mut config = Config::load()?;
    write_value(&mut config, key, value)?;
    config.save()?;

    let shown = if is_secret(key) {
        mask_sensitive_value(value)
    } else {
        value.to_string()
    };

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    }))
    .with_text(format!("Set {} to {}", key.cyan(), shown))
    .print(json)
}

/// Get a configuration value
pub fn cmd_config_get(key: &str, json: bool) -> Result<()> {
    validate_config_key(key)?;

    let config = Config::load()?;
    let value = read_value(&config, key)
        .ok_or_else(|| ArchiefError::Config(format!("{key} is not set")))?;
    let shown = if is_secret(key) {
        mask_sensitive_value(&value)
    } else {
        value
    };

    CommandOutput::new(json!({
        "key": key,
        "value": shown,
    }))
    .with_text(shown.clone())
    .print(json)
}
