use std::{fmt::Write, path::Path, str::FromStr};

use anyhow::bail;
use indoc::indoc;
use serde::Deserialize;
use serde_dynamic_string::DynamicString;
use toml::Value;

use crate::Config;

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let mut raw_config: Value = toml::from_str(&content)?;

    expand_dynamic_strings(&mut Vec::new(), &mut raw_config)?;

    let config = Config::deserialize(raw_config)?;
    validate(&config)?;

    log::debug!("Loaded configuration from {}", path.as_ref().display());

    Ok(config)
}

pub(crate) fn validate(config: &Config) -> anyhow::Result<()> {
    let Some(user_sync) = &config.user_sync else {
        bail!(indoc! {r#"
            No user synchronization configured. panel-auth needs the panel endpoint to fetch users from.

            Example configuration:

              [user_sync]
              url = "https://panel.example.com/api/v1/server/UniProxy/user?token={{ env.PANEL_TOKEN }}&node_id=1"
              interval = "60s"
        "#});
    };

    if user_sync.interval.is_zero() {
        bail!("user_sync.interval must be greater than zero");
    }

    if user_sync.max_response_size == 0 {
        bail!("user_sync.max_response_size must be greater than zero");
    }

    for (name, path) in [("server.auth.path", &config.server.auth.path), ("server.health.path", &config.server.health.path)] {
        if !path.starts_with('/') {
            bail!("{name} must start with '/', got '{path}'");
        }
    }

    if config.server.health.enabled && config.server.health.path == config.server.auth.path {
        bail!("server.auth.path and server.health.path must differ");
    }

    Ok(())
}

fn expand_dynamic_strings<'a>(path: &mut Vec<Result<&'a str, usize>>, value: &'a mut Value) -> anyhow::Result<()> {
    match value {
        Value::String(s) => match DynamicString::<String>::from_str(s) {
            Ok(out) => *s = out.into_inner(),
            Err(err) => {
                let mut p = String::new();
                for segment in path {
                    match segment {
                        Ok(s) => {
                            p.push_str(s);
                            p.push('.');
                        }
                        Err(i) => write!(p, "[{i}]")?,
                    }
                }
                if p.ends_with('.') {
                    p.pop();
                }

                bail!("Failed to expand dynamic string at path '{p}': {err}");
            }
        },
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                path.push(Err(i));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Table(map) => {
            for (key, value) in map {
                path.push(Ok(key.as_str()));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}
