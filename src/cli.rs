// CLI definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rgbscape")]
#[command(author, version, about = "RGB lighting surface with virtual devices")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Surface config (defaults to the user config dir, created on first use)
    #[arg(long, short, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Surface ===
    /// Drive the configured surface with a timer trigger
    Run {
        /// Frames per second (overrides the config)
        #[arg(long)]
        fps: Option<f64>,

        /// Stop after this many frames
        #[arg(long, short = 'n')]
        frames: Option<u64>,

        /// Where device colors go
        #[arg(long, value_enum, default_value_t = Output::Terminal)]
        output: Output,
    },

    /// Render one frame and print every LED
    Dump {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Send every LED, not only changed ones
        #[arg(long)]
        flush: bool,
    },

    // === Utility ===
    /// Show a color in every supported color space
    Color {
        /// Hex color: #RGB, #RRGGBB or #AARRGGBB
        hex: String,
    },

    /// Write the default config file and print its path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Output {
    /// True-color preview in the terminal
    Terminal,
    /// Log every batch at debug level
    Log,
    /// Keep colors in memory and print a summary at exit
    Memory,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::parse_from([
            "rgbscape", "--config", "s.toml", "run", "--fps", "60", "-n", "5", "--output", "memory",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("s.toml")));
        match cli.command {
            Commands::Run {
                fps,
                frames,
                output,
            } => {
                assert_eq!(fps, Some(60.0));
                assert_eq!(frames, Some(5));
                assert_eq!(output, Output::Memory);
            }
            _ => panic!("expected run"),
        }
    }
}
