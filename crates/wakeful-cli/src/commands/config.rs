use clap::Subcommand;
use wakeful_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "defaults.max_snoozes", "feedback.vibration")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match get(&config, &key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            set(&mut config, &key, &value)?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

fn get(config: &Config, key: &str) -> Option<String> {
    match key {
        "defaults.max_snoozes" => Some(config.defaults.max_snoozes.to_string()),
        "defaults.snooze_duration_min" => Some(config.defaults.snooze_duration_min.to_string()),
        "feedback.vibration" => Some(config.feedback.vibration.to_string()),
        "feedback.custom_sound" => Some(
            config
                .feedback
                .custom_sound
                .clone()
                .unwrap_or_else(|| "(default)".into()),
        ),
        _ => None,
    }
}

fn set(config: &mut Config, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    match key {
        "defaults.max_snoozes" => config.defaults.max_snoozes = value.parse()?,
        "defaults.snooze_duration_min" => {
            let minutes: u32 = value.parse()?;
            if minutes == 0 {
                return Err("snooze duration must be at least 1 minute".into());
            }
            config.defaults.snooze_duration_min = minutes;
        }
        "feedback.vibration" => config.feedback.vibration = value.parse()?,
        "feedback.custom_sound" => {
            config.feedback.custom_sound = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
        _ => return Err(format!("unknown key: {key}").into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_round_trip() {
        let mut config = Config::default();
        set(&mut config, "defaults.max_snoozes", "5").unwrap();
        assert_eq!(get(&config, "defaults.max_snoozes").unwrap(), "5");

        set(&mut config, "feedback.vibration", "false").unwrap();
        assert_eq!(get(&config, "feedback.vibration").unwrap(), "false");
    }

    #[test]
    fn zero_snooze_duration_is_rejected() {
        let mut config = Config::default();
        assert!(set(&mut config, "defaults.snooze_duration_min", "0").is_err());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut config = Config::default();
        assert!(get(&config, "nope").is_none());
        assert!(set(&mut config, "nope", "1").is_err());
    }
}
