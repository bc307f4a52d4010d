//! odconvert: an object detection dataset converter.
//!
//! odconvert reads an object detection dataset into a small in-memory model
//! (classes, images and box annotations grouped into named partitions) and
//! writes it back out in another layout. COCO is the supported source and
//! Ultralytics-style YOLO the supported target.
//!
//! # Modules
//!
//! - [`dataset`]: the dataset model plus the COCO reader and YOLO writer
//! - [`conversion`]: the conversion driver and its report
//! - [`detect`]: layout sniffing
//! - [`inspect`]: dataset summaries
//! - [`error`]: error types for odconvert operations

pub mod conversion;
pub mod dataset;
pub mod detect;
pub mod error;
pub mod inspect;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use dataset::io_coco::{BoxConvention, CocoReadOptions};
use dataset::io_yolo::YoloWriteOptions;
use dataset::DatasetType;

pub use error::{ErrorKind, OdConvertError};

/// The odconvert CLI application.
#[derive(Parser)]
#[command(name = "odconvert")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Show the classes and per-partition counts of a dataset.
    Inspect(InspectArgs),
    /// Convert a dataset into another format.
    Convert(ConvertArgs),
    /// Print the detected format of a dataset directory.
    Detect(DetectArgs),
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Dataset directory to inspect.
    input: PathBuf,

    /// Read COCO `bbox` arrays as `[x_center, y_center, width, height]`.
    #[arg(long)]
    bbox_center: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    report_format: String,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Dataset directory to convert.
    input: PathBuf,

    /// Target format ('yolo').
    #[arg(long, default_value = "yolo")]
    to: String,

    /// Directory to write the converted dataset to.
    #[arg(short, long, env = "ODCONVERT_OUTPUT")]
    output: PathBuf,

    /// Copy image files into the output tree.
    #[arg(long)]
    copy_images: bool,

    /// Write into partitions that already have label files.
    #[arg(long)]
    overwrite: bool,

    /// Read COCO `bbox` arrays as `[x_center, y_center, width, height]`.
    #[arg(long)]
    bbox_center: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    report_format: String,
}

/// Arguments for the detect subcommand.
#[derive(clap::Args)]
struct DetectArgs {
    /// Directory to examine.
    input: PathBuf,
}

/// Run the odconvert CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), OdConvertError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Detect(args)) => run_detect(args),
        None => {
            println!("odconvert {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Object detection dataset converter.");
            println!();
            println!("Run 'odconvert --help' for usage information.");
            Ok(())
        }
    }
}

fn read_options(bbox_center: bool) -> CocoReadOptions {
    CocoReadOptions {
        bbox_convention: if bbox_center {
            BoxConvention::Center
        } else {
            BoxConvention::CornerSize
        },
    }
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), OdConvertError> {
    let report = inspect::inspect_path(&args.input, &read_options(args.bbox_center))?;
    print_report(&report, &args.report_format)
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), OdConvertError> {
    let target: DatasetType = args.to.parse()?;

    if detect::detect_type(&args.input) == Some(DatasetType::Yolo) {
        return Err(OdConvertError::UnsupportedFormat(format!(
            "'{}' holds a YOLO dataset; only COCO input can be read",
            args.input.display()
        )));
    }

    let handler =
        dataset::io_coco::read_coco_dir_with(&args.input, &read_options(args.bbox_center))?;

    let report = match target {
        DatasetType::Yolo => {
            let opts = YoloWriteOptions {
                copy_images: args.copy_images,
                overwrite: args.overwrite,
            };
            conversion::convert_to_yolo(&handler, &args.output, &opts)?
        }
        // The only reader is COCO, so this is always a same-format request.
        DatasetType::Coco => return Err(OdConvertError::AlreadyInTargetFormat(target)),
    };

    print_report(&report, &args.report_format)
}

/// Execute the detect subcommand.
fn run_detect(args: DetectArgs) -> Result<(), OdConvertError> {
    match detect::detect_type(&args.input) {
        Some(dataset_type) => println!("{}", dataset_type),
        None => println!("unknown"),
    }
    Ok(())
}

fn print_report<R>(report: &R, format: &str) -> Result<(), OdConvertError>
where
    R: std::fmt::Display + serde::Serialize,
{
    match format {
        "json" => {
            let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
            println!("{}", json);
        }
        "text" => print!("{}", report),
        other => {
            return Err(OdConvertError::UnsupportedFormat(format!(
                "report format '{}' (supported: text, json)",
                other
            )));
        }
    }
    Ok(())
}
