use clap::{Subcommand, ValueEnum};
use clockin_core::SettingsStore;

use super::{open_kv, print_json, CommandResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    Sound,
    AutoStart,
    Cooldown,
    CooldownAutoStart,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print all settings as JSON
    List,
    /// Replace the duration gradations (minutes, all positive)
    Gradations {
        #[arg(required = true, num_args = 1..)]
        minutes: Vec<u32>,
    },
    /// Select the completion sound (chime, bell, digital)
    Sound { id: String },
    /// Flip a boolean preference
    Toggle {
        #[arg(value_enum)]
        setting: Toggle,
    },
    /// Set the cooldown length; clamped to 1..=30 minutes
    CooldownDuration {
        #[arg(allow_hyphen_values = true)]
        minutes: i64,
    },
    /// Restore default settings
    Reset,
}

pub fn run(action: SettingsAction) -> CommandResult {
    let (_config, kv) = open_kv()?;
    let settings = SettingsStore::new(kv);

    match action {
        SettingsAction::List => {}
        SettingsAction::Gradations { minutes } => settings.set_gradations(minutes),
        SettingsAction::Sound { id } => settings.set_sound(&id),
        SettingsAction::Toggle { setting } => match setting {
            Toggle::Sound => settings.toggle_sound(),
            Toggle::AutoStart => settings.toggle_auto_start(),
            Toggle::Cooldown => settings.toggle_cooldown(),
            Toggle::CooldownAutoStart => settings.toggle_cooldown_auto_start(),
        },
        SettingsAction::CooldownDuration { minutes } => settings.set_cooldown_duration(minutes),
        SettingsAction::Reset => settings.reset(),
    }
    print_json(&settings.get())?;
    Ok(())
}
