use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use qrtools_config::ScannerMode;

use crate::present::ResultRequest;

#[derive(Parser)]
#[command(name = "qrtools")]
#[command(version)]
#[command(about = "Generate QR codes and scan them off the screen", long_about = None)]
pub struct Cli {
    /// Config file to use instead of the per-user default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log pipeline details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Encode text as a QR code image
    Generate {
        text: String,

        /// Write SVG instead of PNG
        #[arg(long)]
        svg: bool,

        /// Destination file, skipping auto naming and the save prompt
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Select a screen region and decode the QR code in it
    Scan {
        /// Override the configured scanner mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        #[command(flatten)]
        result: ResultArgs,
    },
    /// Decode the QR code in an image file
    Decode {
        image: PathBuf,

        #[command(flatten)]
        result: ResultArgs,
    },
    /// Scan whenever the configured hotkey is pressed
    Listen {
        #[command(flatten)]
        result: ResultArgs,
    },
    /// Show or change saved options
    Options {
        /// Change an option, e.g. --set ScannerMode=2 (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ResultArgs {
    /// Open a decoded link in the default browser
    #[arg(long)]
    pub open: bool,

    /// Save decoded plain text to a file
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Copy the decoded text to the clipboard
    #[arg(long)]
    pub copy: bool,
}

impl From<ResultArgs> for ResultRequest {
    fn from(args: ResultArgs) -> Self {
        Self {
            open: args.open,
            save: args.save,
            copy: args.copy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    DrawBox,
    Targeting,
    Automatic,
}

impl From<ModeArg> for ScannerMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::DrawBox => ScannerMode::DrawBox,
            ModeArg::Targeting => ScannerMode::TargetingRectangle,
            ModeArg::Automatic => ScannerMode::AutomaticDetection,
        }
    }
}
