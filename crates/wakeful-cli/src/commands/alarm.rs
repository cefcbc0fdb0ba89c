use std::collections::BTreeSet;

use clap::Subcommand;
use wakeful_core::storage::{AlarmStore, Config, FileStore};
use wakeful_core::{AlarmDefinition, Recurrence, Weekday};

#[derive(Subcommand)]
pub enum AlarmAction {
    /// Create a new alarm
    Add {
        /// Wall-clock time, "HH:MM"
        time: String,
        /// Repeat rule: "once", "daily", "weekend", or a comma-separated
        /// weekday list like "mon,wed,fri"
        #[arg(long, default_value = "once")]
        repeat: String,
        /// Alarm title
        #[arg(long, default_value = "Alarm")]
        title: String,
        /// Notification message
        #[arg(long, default_value = "")]
        message: String,
        /// Snooze budget (config default when omitted)
        #[arg(long)]
        max_snoozes: Option<u32>,
        /// Snooze duration in minutes (config default when omitted)
        #[arg(long)]
        snooze_duration: Option<u32>,
    },
    /// List all alarms
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an alarm
    Remove {
        /// Alarm id
        id: u32,
    },
    /// Activate an alarm
    Enable {
        /// Alarm id
        id: u32,
    },
    /// Deactivate an alarm without deleting it
    Disable {
        /// Alarm id
        id: u32,
    },
}

pub fn run(action: AlarmAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = FileStore::open_default()?;

    match action {
        AlarmAction::Add {
            time,
            repeat,
            title,
            message,
            max_snoozes,
            snooze_duration,
        } => {
            let (hour, minute) = parse_time(&time)?;
            let recurrence = parse_repeat(&repeat)?;
            let config = Config::load_or_default();

            let id = store
                .load_all()?
                .iter()
                .map(|a| a.id)
                .max()
                .map_or(1, |max| max + 1);
            let def = AlarmDefinition {
                id,
                hour,
                minute,
                title,
                message,
                recurrence,
                max_snoozes: max_snoozes.unwrap_or(config.defaults.max_snoozes),
                snooze_duration_min: snooze_duration
                    .unwrap_or(config.defaults.snooze_duration_min),
                is_active: true,
            };
            def.validate()?;
            store.save(&def)?;
            println!("{}", serde_json::to_string_pretty(&def)?);
        }
        AlarmAction::List { json } => {
            let alarms = store.load_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&alarms)?);
            } else if alarms.is_empty() {
                println!("no alarms");
            } else {
                for a in alarms {
                    let state = if a.is_active { "on " } else { "off" };
                    println!(
                        "{:>4}  {:02}:{:02}  {}  {}  {}",
                        a.id,
                        a.hour,
                        a.minute,
                        state,
                        describe_repeat(&a.recurrence),
                        a.title
                    );
                }
            }
        }
        AlarmAction::Remove { id } => {
            store.delete(id)?;
            println!("alarm {id} removed");
        }
        AlarmAction::Enable { id } => set_active(&mut store, id, true)?,
        AlarmAction::Disable { id } => set_active(&mut store, id, false)?,
    }
    Ok(())
}

fn set_active(
    store: &mut FileStore,
    id: u32,
    active: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut def = store
        .load_all()?
        .into_iter()
        .find(|a| a.id == id)
        .ok_or_else(|| format!("no alarm with id {id}"))?;
    def.is_active = active;
    store.save(&def)?;
    println!(
        "alarm {id} {}",
        if active { "enabled" } else { "disabled" }
    );
    Ok(())
}

fn parse_time(s: &str) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let (h, m) = s
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got {s:?}"))?;
    let hour: u32 = h.parse()?;
    let minute: u32 = m.parse()?;
    if hour > 23 || minute > 59 {
        return Err(format!("time out of range: {s:?}").into());
    }
    Ok((hour, minute))
}

fn parse_repeat(s: &str) -> Result<Recurrence, Box<dyn std::error::Error>> {
    match s {
        "once" => return Ok(Recurrence::Once),
        "daily" => return Ok(Recurrence::Daily),
        "weekend" => return Ok(Recurrence::Weekend),
        _ => {}
    }
    let mut days = BTreeSet::new();
    for part in s.split(',') {
        let day = match part.trim() {
            "mon" => Weekday::Mon,
            "tue" => Weekday::Tue,
            "wed" => Weekday::Wed,
            "thu" => Weekday::Thu,
            "fri" => Weekday::Fri,
            "sat" => Weekday::Sat,
            "sun" => Weekday::Sun,
            other => return Err(format!("unknown weekday {other:?}").into()),
        };
        days.insert(day);
    }
    Ok(Recurrence::Custom { days })
}

fn describe_repeat(r: &Recurrence) -> String {
    match r {
        Recurrence::Once => "once".into(),
        Recurrence::Daily => "daily".into(),
        Recurrence::Weekend => "weekend".into(),
        Recurrence::Custom { days } => days
            .iter()
            .map(|d| format!("{d:?}").to_lowercase())
            .collect::<Vec<_>>()
            .join(","),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_repeat_rules() {
        assert_eq!(parse_repeat("once").unwrap(), Recurrence::Once);
        assert_eq!(parse_repeat("daily").unwrap(), Recurrence::Daily);
        assert_eq!(parse_repeat("weekend").unwrap(), Recurrence::Weekend);
    }

    #[test]
    fn parses_weekday_lists() {
        let r = parse_repeat("mon,wed,fri").unwrap();
        let Recurrence::Custom { days } = r else {
            panic!("expected custom recurrence");
        };
        assert_eq!(days.len(), 3);
        assert!(days.contains(&Weekday::Wed));
    }

    #[test]
    fn rejects_unknown_weekday() {
        assert!(parse_repeat("mon,funday").is_err());
    }

    #[test]
    fn parses_and_bounds_times() {
        assert_eq!(parse_time("07:30").unwrap(), (7, 30));
        assert_eq!(parse_time("23:59").unwrap(), (23, 59));
        assert!(parse_time("24:00").is_err());
        assert!(parse_time("730").is_err());
    }
}
