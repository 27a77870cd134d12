use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use fittrack::parsers::{AdapterRegistry, MonthLabelRows};
use fittrack::services::pipeline::{extract_ranges, Pipeline, PipelineOutput};
use fittrack::sources::open_reader;
use fittrack::types::{Category, Metric, PipelineConfig, SourceSpec, UnknownMonthPolicy};

/// Aggregate workout distances and body metrics from CSV and spreadsheet exports
#[derive(Parser)]
#[command(name = "fittrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log filter (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "FITTRACK_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate walked/ran/cycled from a delimited `date;walked;ran;cycled` export
    Workouts {
        /// Input CSV/TSV file
        file: PathBuf,

        /// Output JSON file ("-" for stdout)
        #[arg(long, default_value = "workout_data.json")]
        out: PathBuf,
    },

    /// Monthly averages from a delimited body-metric export
    Body {
        /// Input CSV/TSV with Date, Weight, Body Fat, Body age
        file: PathBuf,

        /// Output JSON file ("-" for stdout)
        #[arg(long, default_value = "body_data.json")]
        out: PathBuf,
    },

    /// Aggregate sheet ranges of a workbook export
    Sheet(SheetArgs),

    /// Dump raw sheet ranges of a workbook export as JSON
    Extract {
        #[command(flatten)]
        ranges: RangeArgs,

        /// Output JSON file ("-" for stdout)
        #[arg(long, default_value = "data.json")]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// Workbook (.ods, .xlsx, .xls) or JSON export of sheet name to rows
    #[arg(long)]
    file: PathBuf,

    /// Sheet name; repeat together with --range
    #[arg(long = "sheet", required = true)]
    sheets: Vec<String>,

    /// Cell range such as A1:D28; one per --sheet
    #[arg(long = "range", required = true)]
    ranges: Vec<String>,
}

impl RangeArgs {
    fn source(&self) -> SourceSpec {
        SourceSpec::Workbook {
            path: self.file.clone(),
            sheets: self.sheets.clone(),
            ranges: self.ranges.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct SheetArgs {
    #[command(flatten)]
    ranges: RangeArgs,

    /// What to aggregate
    #[arg(long, value_enum, default_value = "activities")]
    category: Category,

    /// Activity row layout (sheet-daily, sheet-monthly)
    #[arg(long, default_value = AdapterRegistry::SHEET_DAILY)]
    layout: String,

    /// Metric for each of the three columns after a month label
    #[arg(long, value_enum, value_delimiter = ',')]
    columns: Option<Vec<ColumnArg>>,

    /// How to treat month labels with an unknown abbreviation
    #[arg(long, value_enum, default_value = "drop")]
    unknown_month: UnknownMonthPolicy,

    /// Output JSON file ("-" for stdout)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColumnArg {
    Walked,
    Ran,
    Cycled,
    Skip,
}

impl ColumnArg {
    fn metric(self) -> Option<Metric> {
        match self {
            ColumnArg::Walked => Some(Metric::Walked),
            ColumnArg::Ran => Some(Metric::Ran),
            ColumnArg::Cycled => Some(Metric::Cycled),
            ColumnArg::Skip => None,
        }
    }
}

impl SheetArgs {
    fn pipeline(&self) -> Pipeline {
        let config = PipelineConfig::new(self.category, self.ranges.source())
            .with_layout(self.layout.clone())
            .with_unknown_month(self.unknown_month);

        let mut registry = AdapterRegistry::new(self.unknown_month);
        if let Some(columns) = self.columns.as_deref() {
            let mut mapped = [None; 3];
            for (slot, column) in mapped.iter_mut().zip(columns) {
                *slot = column.metric();
            }
            registry.register(Box::new(
                MonthLabelRows::new(self.unknown_month).with_columns(mapped),
            ));
        }

        Pipeline::new(config).with_registry(registry)
    }

    fn default_out(&self) -> PathBuf {
        match self.category {
            Category::Activities => PathBuf::from("workout_data.json"),
            Category::Body => PathBuf::from("body_data.json"),
        }
    }
}

fn write_json<T: Serialize>(value: &T, out: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if out == Path::new("-") {
        println!("{}", json);
    } else {
        fs::write(out, json + "\n")?;
    }
    Ok(())
}

fn report(output: &PipelineOutput, label: &str, out: &Path) -> anyhow::Result<()> {
    write_json(&output.report, out)?;
    if out != Path::new("-") {
        println!("✅ {} aggregated → {}", label, out.display());
    }
    if output.stats.rows_skipped > 0 {
        eprintln!(
            "[fittrack] {} of {} rows skipped",
            output.stats.rows_skipped, output.stats.rows_read
        );
    }
    Ok(())
}

fn label(category: Category) -> &'static str {
    match category {
        Category::Activities => "Workout data",
        Category::Body => "Body metrics",
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Workouts { file, out } => {
                let config = PipelineConfig::new(Category::Activities, SourceSpec::Delimited(file));
                let output = Pipeline::new(config).run()?;
                report(&output, label(Category::Activities), &out)
            }
            Commands::Body { file, out } => {
                let config = PipelineConfig::new(Category::Body, SourceSpec::Delimited(file));
                let output = Pipeline::new(config).run()?;
                report(&output, label(Category::Body), &out)
            }
            Commands::Sheet(args) => {
                let output = args.pipeline().run()?;
                let out = args.out.clone().unwrap_or_else(|| args.default_out());
                report(&output, label(args.category), &out)
            }
            Commands::Extract { ranges, out } => {
                let config = PipelineConfig::new(Category::Activities, ranges.source());
                // validate pairs before touching the file
                config.sheet_ranges()?;
                let reader = open_reader(&ranges.file)?;
                let grids = extract_ranges(reader.as_ref(), &config)?;
                write_json(&grids, &out)
            }
        }
    }
}
