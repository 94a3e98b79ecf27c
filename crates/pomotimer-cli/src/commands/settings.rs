use clap::Subcommand;
use pomotimer_core::{Config, Settings};

use super::open_engine;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the settings in effect
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change one or more settings
    Set {
        /// Work phase length in minutes (1-60)
        #[arg(long)]
        work: Option<u32>,
        /// Short break length in minutes (1-30)
        #[arg(long)]
        short: Option<u32>,
        /// Long break length in minutes (1-60)
        #[arg(long)]
        long: Option<u32>,
        /// Work cycles before the long break (1-10)
        #[arg(long)]
        cycles: Option<u32>,
        /// Stop at every phase boundary instead of auto-advancing
        #[arg(long)]
        manual: Option<bool>,
    },
}

/// `current` with every provided field replaced.
pub fn merge(
    current: Settings,
    work: Option<u32>,
    short: Option<u32>,
    long: Option<u32>,
    cycles: Option<u32>,
    manual: Option<bool>,
) -> Settings {
    Settings {
        work_duration: work.unwrap_or(current.work_duration),
        short_break_duration: short.unwrap_or(current.short_break_duration),
        long_break_duration: long.unwrap_or(current.long_break_duration),
        cycles_before_long_break: cycles.unwrap_or(current.cycles_before_long_break),
        manual_mode: manual.unwrap_or(current.manual_mode),
    }
}

fn print_settings(settings: &Settings, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(settings)?);
    } else {
        println!("work:        {} min", settings.work_duration);
        println!("short break: {} min", settings.short_break_duration);
        println!("long break:  {} min", settings.long_break_duration);
        println!("cycles:      {}", settings.cycles_before_long_break);
        println!("manual mode: {}", settings.manual_mode);
    }
    Ok(())
}

pub fn run(action: SettingsAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine(config)?;

    match action {
        SettingsAction::Show { json } => print_settings(&engine.state().settings, json)?,
        SettingsAction::Set {
            work,
            short,
            long,
            cycles,
            manual,
        } => {
            let settings = merge(engine.state().settings, work, short, long, cycles, manual);
            settings.validate()?;
            engine.update_settings(settings);
            print_settings(&engine.state().settings, true)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_only_given_fields() {
        let merged = merge(Settings::default(), Some(50), None, None, Some(2), Some(true));
        assert_eq!(merged.work_duration, 50);
        assert_eq!(merged.short_break_duration, 5);
        assert_eq!(merged.long_break_duration, 15);
        assert_eq!(merged.cycles_before_long_break, 2);
        assert!(merged.manual_mode);
    }
}
