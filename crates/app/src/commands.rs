//! Command-line surface over the settings store and startup gate.

use anyhow::{bail, Context, Result};
use services::ollama_probe::CompanionProbe;
use services::settings_store::SettingsStore;
use services::startup_gate::{GateOutcome, StartupGate};

pub const USAGE: &str = "\
Usage: charles <command>

Commands:
  gate [path]                      Run the startup gate for a route (default /)
  gate-reset                       Forget the cached Ollama check
  probe                            Check for Ollama without touching the cache
  settings show                    Print the saved settings
  settings theme <name>            Save and apply a theme
  settings set-username <name>     Save the church username
  settings set-password <secret>   Save the church password
  settings add-message <text>      Append a custom message
  settings remove-message <index>  Remove a custom message
  settings reset                   Delete saved settings";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Gate { path: String },
    GateReset,
    Probe,
    ShowSettings,
    SetTheme(String),
    SetUsername(String),
    SetPassword(String),
    AddMessage(String),
    RemoveMessage(usize),
    ResetSettings,
    Help,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = match args.as_slice() {
            [] | ["help"] | ["--help"] | ["-h"] => Command::Help,
            ["gate"] => Command::Gate { path: "/".into() },
            ["gate", path] => Command::Gate {
                path: path.to_string(),
            },
            ["gate-reset"] => Command::GateReset,
            ["probe"] => Command::Probe,
            ["settings"] | ["settings", "show"] => Command::ShowSettings,
            ["settings", "theme", name] => Command::SetTheme(name.to_string()),
            ["settings", "set-username", name] => Command::SetUsername(name.to_string()),
            ["settings", "set-password", secret] => Command::SetPassword(secret.to_string()),
            ["settings", "add-message", rest @ ..] if !rest.is_empty() => {
                Command::AddMessage(rest.join(" "))
            }
            ["settings", "remove-message", index] => Command::RemoveMessage(
                index
                    .parse()
                    .with_context(|| format!("Invalid message index: {}", index))?,
            ),
            ["settings", "reset"] => Command::ResetSettings,
            _ => bail!("Unknown command: {}\n\n{}", args.join(" "), USAGE),
        };
        Ok(command)
    }
}

/// Everything a command may touch.
pub struct CommandContext<'a> {
    pub settings: &'a SettingsStore,
    pub gate: &'a StartupGate,
    pub probe: &'a dyn CompanionProbe,
}

pub async fn run(command: Command, ctx: &CommandContext<'_>) -> Result<String> {
    let output = match command {
        Command::Help => USAGE.to_string(),
        Command::Gate { path } => match ctx.gate.check(&path).await? {
            GateOutcome::Bypassed => format!("{}: not gated", path),
            GateOutcome::Proceed => format!("{}: Ollama installed, continuing", path),
            GateOutcome::Redirect(r) => format!("{}: redirect {} {}", path, r.status, r.location),
        },
        Command::GateReset => {
            ctx.gate.invalidate()?;
            "Cleared cached Ollama check".to_string()
        }
        Command::Probe => {
            if ctx.probe.is_installed().await? {
                "Ollama is installed".to_string()
            } else {
                "Ollama is not installed".to_string()
            }
        }
        Command::ShowSettings => {
            serde_json::to_string_pretty(&ctx.settings.current().redacted())?
        }
        Command::SetTheme(name) => {
            ctx.settings.update(|s| s.preferred_theme = name)?;
            format!("Theme set to {}", ctx.settings.theme())
        }
        Command::SetUsername(name) => {
            ctx.settings.update(|s| s.church_username = name)?;
            "Saved username".to_string()
        }
        Command::SetPassword(secret) => {
            ctx.settings.update(|s| s.church_password = secret)?;
            "Saved password".to_string()
        }
        Command::AddMessage(text) => {
            let saved = ctx.settings.add_custom_message(text)?;
            format!("Saved ({} custom messages)", saved.custom_messages.len())
        }
        Command::RemoveMessage(index) => {
            let saved = ctx.settings.remove_custom_message(index)?;
            format!("Removed ({} custom messages left)", saved.custom_messages.len())
        }
        Command::ResetSettings => {
            ctx.settings.reset()?;
            "Settings reset to defaults".to_string()
        }
    };
    Ok(output)
}
