use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cardpile_core::{instance_bytes, PileEngine, PileSettings};
use cardpile_platform::{Result, VisualFactory};
use cardpile_ui::run_viewer;
use glam::Vec2;

#[derive(Parser)]
#[command(name = "cardpile-app")]
#[command(about = "Lay out and view a curved pile of cards")]
struct Cmd {
    /// TOML settings file with [pile] and [controls] tables; defaults when omitted
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Action {
    /// Open the interactive viewer (the default)
    View,
    /// Evaluate the pile once and print it as JSON
    Dump {
        /// Also write the pile's GPU instance buffer to this file
        #[arg(long)]
        instances: Option<PathBuf>,
    },
    /// Print the effective settings as TOML
    PrintConfig,
}

/// Stand-in visuals for headless runs; handles are just slot numbers.
#[derive(Default)]
struct NullVisuals {
    next: usize,
}

impl VisualFactory for NullVisuals {
    type Handle = usize;

    fn create_visual(&mut self) -> usize {
        self.next += 1;
        self.next - 1
    }
    fn destroy_visual(&mut self, _handle: usize) {}
    fn set_local_position(&mut self, _handle: &usize, _position: Vec2) {}
    fn set_local_rotation(&mut self, _handle: &usize, _degrees: f32) {}
}

fn main() {
    let cmd = Cmd::parse();

    // Init logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    info!("Cardpile starting");
    if let Err(e) = run(cmd) {
        eprintln!("Cardpile error: {e}");
        std::process::exit(1);
    }
}

fn run(cmd: Cmd) -> Result<()> {
    let settings = match cmd.settings {
        Some(path) => PileSettings::load(path)?,
        None => PileSettings::default(),
    };

    match cmd.action.unwrap_or(Action::View) {
        Action::View => run_viewer(settings),
        Action::Dump { instances } => dump(settings, instances.as_deref()),
        Action::PrintConfig => {
            print!("{}", settings.to_toml_string()?);
            Ok(())
        }
    }
}

fn dump(settings: PileSettings, instances_path: Option<&Path>) -> Result<()> {
    let mut engine: PileEngine<usize> = PileEngine::with_controls(settings.pile, settings.controls);
    engine.update(Vec2::ZERO, &mut NullVisuals::default(), &mut ());
    println!("{}", engine.snapshot().to_json_pretty()?);

    if let Some(path) = instances_path {
        let instances = engine.instances();
        let bytes = instance_bytes(&instances);
        std::fs::write(path, bytes)?;
        info!(
            "Wrote {} card instances ({} bytes) to {}",
            instances.len(),
            bytes.len(),
            path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_valid() {
        Cmd::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_viewer() {
        let cmd = Cmd::try_parse_from(["cardpile-app"]).unwrap();
        assert!(cmd.action.is_none());
        assert!(cmd.settings.is_none());
    }

    #[test]
    fn test_dump_with_settings_and_instances() {
        let cmd = Cmd::try_parse_from([
            "cardpile-app",
            "dump",
            "--settings",
            "cardpile.toml",
            "--instances",
            "pile.bin",
        ])
        .unwrap();
        assert_eq!(cmd.settings, Some(PathBuf::from("cardpile.toml")));
        assert_eq!(
            cmd.action,
            Some(Action::Dump {
                instances: Some(PathBuf::from("pile.bin"))
            })
        );
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = Cmd::try_parse_from(["cardpile-app", "--dumb"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_stray_positional_is_rejected() {
        assert!(Cmd::try_parse_from(["cardpile-app", "a.toml", "b.toml"]).is_err());
        assert!(Cmd::try_parse_from(["cardpile-app", "dump", "a.toml"]).is_err());
    }

    #[test]
    fn test_dump_writes_instance_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pile.bin");
        dump(PileSettings::default(), Some(&path)).unwrap();
        let written = std::fs::read(&path).unwrap();
        // default controls: half of 10 cards, 16 bytes each
        assert_eq!(written.len(), 5 * 16);
    }
}
