//! Pipeline orchestration
//!
//! Reads every requested grid up front (so structural errors abort before
//! any output), then drives rows through an adapter, the normalizer and the
//! aggregator. Row errors are counted and logged, never returned.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::parsers::{AdapterRegistry, BodySchema, RowSourceAdapter};
use crate::services::Aggregator;
use crate::sources::{open_reader, CellRangeReader, DelimitedSource, Grid};
use crate::types::{
    ActivityReport, BodyMonth, BodyRecord, Category, FittrackError, IngestStats, PipelineConfig,
    Result, SourceSpec,
};

/// Finished aggregate, serialized in its plain output shape
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Activities(ActivityReport),
    Body(Vec<BodyMonth>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub report: Report,
    pub stats: IngestStats,
}

/// Fold activity rows through `adapter`.
///
/// A header line at the top of a grid is left out and not counted.
pub fn aggregate_activities(
    grids: &[Grid],
    adapter: &dyn RowSourceAdapter,
) -> (ActivityReport, IngestStats) {
    let mut stats = IngestStats::default();
    let mut records = Vec::new();

    for grid in grids {
        let rows = match grid.first() {
            Some(first) if adapter.is_header(first) => &grid[1..],
            _ => &grid[..],
        };

        for (index, row) in rows.iter().enumerate() {
            match adapter.extract(row) {
                Ok(record) => {
                    records.push(record);
                    stats.record_used();
                }
                Err(e) => {
                    debug!(row = index, adapter = adapter.name(), "skipping row: {}", e);
                    stats.record_skipped();
                }
            }
        }
    }

    (Aggregator::activities(&records), stats)
}

/// Fold body-metric rows; each grid gets its own header probe
pub fn aggregate_body(grids: &[Grid]) -> (Vec<BodyMonth>, IngestStats) {
    let mut stats = IngestStats::default();
    let mut records: Vec<BodyRecord> = Vec::new();

    for grid in grids {
        let Some(first) = grid.first() else {
            continue;
        };
        let schema = BodySchema::probe(first);
        let rows = if schema.has_header() {
            &grid[1..]
        } else {
            debug!("no body-metric header found, reading columns positionally");
            &grid[..]
        };

        for (index, row) in rows.iter().enumerate() {
            match schema.extract(row) {
                Ok(record) => {
                    records.push(record);
                    stats.record_used();
                }
                Err(e) => {
                    debug!(row = index, "skipping body row: {}", e);
                    stats.record_skipped();
                }
            }
        }
    }

    (Aggregator::body(&records), stats)
}

/// Read each sheet/range pair from `reader`, keyed by sheet name
pub fn extract_ranges(
    reader: &dyn CellRangeReader,
    config: &PipelineConfig,
) -> Result<BTreeMap<String, Grid>> {
    let mut out = BTreeMap::new();
    for (sheet, range) in config.sheet_ranges()? {
        let grid = reader.read_range(&sheet, &range)?;
        out.insert(sheet, grid);
    }
    Ok(out)
}

/// One configured pipeline run
pub struct Pipeline {
    config: PipelineConfig,
    registry: AdapterRegistry,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let registry = AdapterRegistry::new(config.unknown_month);
        Self { config, registry }
    }

    /// Use a custom adapter registry (e.g. remapped month-label columns)
    pub fn with_registry(mut self, registry: AdapterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Resolve the activity adapter before any input is read
    fn adapter(&self) -> Result<&dyn RowSourceAdapter> {
        let name = match (&self.config.layout, &self.config.source) {
            (Some(name), _) => name.as_str(),
            (None, SourceSpec::Delimited(_)) => AdapterRegistry::DELIMITED_DAILY,
            (None, SourceSpec::Workbook { .. }) => AdapterRegistry::SHEET_DAILY,
        };
        self.registry
            .get(name)
            .ok_or_else(|| FittrackError::Config(format!("unknown layout '{}'", name)))
    }

    /// Load every grid the run needs
    pub fn load_grids(&self) -> Result<Vec<Grid>> {
        match &self.config.source {
            SourceSpec::Delimited(path) => Ok(vec![DelimitedSource::open(path)?.grid()?]),
            SourceSpec::Workbook { path, .. } => {
                let pairs = self.config.sheet_ranges()?;
                let reader = open_reader(path)?;
                pairs
                    .iter()
                    .map(|(sheet, range)| reader.read_range(sheet, range))
                    .collect()
            }
        }
    }

    /// Aggregate already-loaded grids
    pub fn run_grids(&self, grids: &[Grid]) -> Result<PipelineOutput> {
        let (report, stats) = match self.config.category {
            Category::Activities => {
                let (report, stats) = aggregate_activities(grids, self.adapter()?);
                (Report::Activities(report), stats)
            }
            Category::Body => {
                let (months, stats) = aggregate_body(grids);
                (Report::Body(months), stats)
            }
        };

        info!(
            rows_read = stats.rows_read,
            rows_used = stats.rows_used,
            rows_skipped = stats.rows_skipped,
            "aggregation finished"
        );

        Ok(PipelineOutput { report, stats })
    }

    /// Validate, load and aggregate
    pub fn run(&self) -> Result<PipelineOutput> {
        self.config.sheet_ranges()?;
        if self.config.category == Category::Activities {
            self.adapter()?;
        }
        let grids = self.load_grids()?;
        self.run_grids(&grids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{row, MonthLabelRows};
    use crate::types::{Metric, MonthKey, UnknownMonthPolicy};
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    fn workbook_config(category: Category, sheets: &[&str], ranges: &[&str]) -> PipelineConfig {
        PipelineConfig::new(
            category,
            SourceSpec::Workbook {
                path: fixture("workbook.json"),
                sheets: sheets.iter().map(|s| s.to_string()).collect(),
                ranges: ranges.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    fn activities(output: &PipelineOutput) -> &ActivityReport {
        match &output.report {
            Report::Activities(report) => report,
            Report::Body(_) => panic!("expected activity report"),
        }
    }

    fn body(output: &PipelineOutput) -> &[BodyMonth] {
        match &output.report {
            Report::Body(months) => months,
            Report::Activities(_) => panic!("expected body report"),
        }
    }

    fn assert_sum_invariant(report: &ActivityReport) {
        for metric in Metric::ALL {
            let total = report.totals.get(metric);
            let yearly: f64 = report.yearly.values().map(|t| t.get(metric)).sum();
            let monthly: f64 = report.monthly.values().map(|t| t.get(metric)).sum();
            assert!((yearly - total).abs() < 1e-9, "{:?} yearly", metric);
            assert!((monthly - total).abs() < 1e-9, "{:?} monthly", metric);
        }
    }

    // ========== activities ==========

    #[test]
    fn test_delimited_workouts_fixture() {
        let config = PipelineConfig::new(
            Category::Activities,
            SourceSpec::Delimited(fixture("workouts.csv")),
        );
        let output = Pipeline::new(config).run().unwrap();
        let report = activities(&output);

        // header is not a row; a bad date and a short row are skipped
        assert_eq!(output.stats.rows_read, 7);
        assert_eq!(output.stats.rows_skipped, 2);
        assert_eq!(output.stats.rows_used, 5);
        assert!((report.totals.walked - 15.0).abs() < 1e-9);
        assert!((report.totals.ran - 10.0).abs() < 1e-9);
        assert!((report.totals.cycled - 40.5).abs() < 1e-9);
        assert_eq!(report.yearly.len(), 2);
        assert_eq!(report.monthly.len(), 3);
        assert_sum_invariant(report);
    }

    #[test]
    fn test_unparseable_date_excluded_everywhere() {
        let grids = vec![vec![
            row(&["2023-01-01", "1", "2", "3"]),
            row(&["2023-13-01", "100", "100", "100"]),
        ]];
        let adapter = crate::parsers::DatedRows::delimited();
        let (report, stats) = aggregate_activities(&grids, &adapter);

        assert_eq!(stats.rows_skipped, 1);
        assert_eq!(report.totals.walked, 1.0);
        assert_eq!(report.monthly.len(), 1);
        assert_eq!(report.yearly[&2023].cycled, 3.0);
    }

    #[test]
    fn test_negative_distance_excluded_everywhere() {
        let grids = vec![vec![
            row(&["2023-01-01", "1", "2", "3"]),
            row(&["2023-02-01", "-5", "-1,5", "2"]),
            row(&["2024-01-01", "4", "0", "1"]),
        ]];
        let (report, stats) = aggregate_activities(&grids, &crate::parsers::DatedRows::delimited());

        assert_eq!(stats.rows_skipped, 1);
        assert_eq!(report.totals.walked, 5.0);
        assert_eq!(report.totals.cycled, 4.0);
        assert!(!report.monthly.contains_key(&MonthKey::new(2023, 2)));
        assert_eq!(report.yearly[&2023].ran, 2.0);
        assert_sum_invariant(&report);
    }

    #[test]
    fn test_header_rows_not_counted_per_grid() {
        let grids = vec![
            vec![
                row(&["Date", "Walked", "Ran", "Cycled"]),
                row(&["2023-01-01", "1", "2", "3"]),
            ],
            vec![
                row(&["Datum", "walked", "ran", "cycled"]),
                row(&["2023-01-02", "1", "0", "0"]),
                row(&["garbage", "1", "0", "0"]),
            ],
        ];
        let (report, stats) = aggregate_activities(&grids, &crate::parsers::DatedRows::sheet());

        assert_eq!(stats.rows_read, 3);
        assert_eq!(stats.rows_used, 2);
        assert_eq!(stats.rows_skipped, 1);
        assert_eq!(report.totals.walked, 2.0);
    }

    #[test]
    fn test_all_zero_input() {
        let grids = vec![vec![
            row(&["2023-01-01", "0", "0", "0"]),
            row(&["2023-05-01", "", "0,0", "--"]),
        ]];
        let (report, _) = aggregate_activities(&grids, &crate::parsers::DatedRows::delimited());
        for metric in Metric::ALL {
            assert_eq!(report.totals.get(metric), 0.0);
            assert!(report.yearly.values().all(|t| t.get(metric) == 0.0));
            assert!(report.monthly.values().all(|t| t.get(metric) == 0.0));
        }
    }

    #[test]
    fn test_workbook_daily_sheet() {
        let config = workbook_config(Category::Activities, &["Daily"], &["A2:D6"]);
        let output = Pipeline::new(config).run().unwrap();
        let report = activities(&output);

        assert_eq!(output.stats.rows_read, 5);
        assert_eq!(output.stats.rows_skipped, 1);
        assert!((report.totals.walked - 9.5).abs() < 1e-9);
        assert_sum_invariant(report);
    }

    #[test]
    fn test_workbook_monthly_sheet_excludes_subtotals() {
        let config = workbook_config(Category::Activities, &["Monthly"], &["A2:D6"])
            .with_layout(AdapterRegistry::SHEET_MONTHLY);
        let output = Pipeline::new(config).run().unwrap();
        let report = activities(&output);

        assert!(report.yearly.is_empty());
        assert_eq!(report.monthly.len(), 3);
        assert!((report.totals.walked - 120.0).abs() < 1e-9);
        assert!((report.totals.ran - 30.0).abs() < 1e-9);
        assert_eq!(report.totals.cycled, 0.0);
        assert!((report.monthly[&MonthKey::new(2023, 3)].walked - 45.5).abs() < 1e-9);
    }

    #[test]
    fn test_custom_registry_columns() {
        let mut registry = AdapterRegistry::new(UnknownMonthPolicy::Drop);
        registry.register(Box::new(
            MonthLabelRows::new(UnknownMonthPolicy::Drop).with_columns([
                Some(Metric::Walked),
                None,
                Some(Metric::Cycled),
            ]),
        ));
        let config = workbook_config(Category::Activities, &["Monthly"], &["A2:D6"])
            .with_layout(AdapterRegistry::SHEET_MONTHLY);
        let output = Pipeline::new(config).with_registry(registry).run().unwrap();
        let report = activities(&output);

        assert_eq!(report.totals.ran, 0.0);
        assert!((report.totals.cycled - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_multiple_sheets_feed_one_aggregate() {
        let config = workbook_config(Category::Activities, &["Daily", "Daily"], &["A2:D3", "A4:D6"]);
        let output = Pipeline::new(config).run().unwrap();
        assert!((activities(&output).totals.walked - 9.5).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent_output() {
        let config = workbook_config(Category::Activities, &["Daily"], &["A1:D6"]);
        let pipeline = Pipeline::new(config);
        let first = serde_json::to_string_pretty(&pipeline.run().unwrap().report).unwrap();
        let second = serde_json::to_string_pretty(&pipeline.run().unwrap().report).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_xlsx_workbook_sheet() {
        let config = PipelineConfig::new(
            Category::Activities,
            SourceSpec::Workbook {
                path: fixture("workouts.xlsx"),
                sheets: vec!["Daily".into()],
                ranges: vec!["A1:D4".into()],
            },
        );
        let output = Pipeline::new(config).run().unwrap();
        let report = activities(&output);

        // header left out, "Total" row skipped
        assert_eq!(output.stats.rows_read, 3);
        assert_eq!(output.stats.rows_skipped, 1);
        assert!((report.totals.walked - 6.0).abs() < 1e-9);
        assert_eq!(report.totals.ran, 0.0);
        assert!((report.totals.cycled - 32.5).abs() < 1e-9);
        assert_eq!(report.monthly.len(), 2);
        assert_sum_invariant(report);
    }

    #[test]
    fn test_xlsx_missing_sheet_aborts() {
        let config = PipelineConfig::new(
            Category::Activities,
            SourceSpec::Workbook {
                path: fixture("workouts.xlsx"),
                sheets: vec!["Weekly".into()],
                ranges: vec!["A1:D4".into()],
            },
        );
        let err = Pipeline::new(config).run().unwrap_err();
        assert!(matches!(err, FittrackError::SheetNotFound(_)));
    }

    // ========== structural errors ==========

    #[test]
    fn test_missing_sheet_aborts() {
        let config = workbook_config(Category::Activities, &["Nope"], &["A1:D4"]);
        let err = Pipeline::new(config).run().unwrap_err();
        assert!(matches!(err, FittrackError::SheetNotFound(_)));
    }

    #[test]
    fn test_mismatched_pairs_abort_before_reading() {
        let mut config = workbook_config(Category::Activities, &["Daily", "Monthly"], &["A1:D4"]);
        if let SourceSpec::Workbook { path, .. } = &mut config.source {
            *path = fixture("does-not-exist.json");
        }
        let err = Pipeline::new(config).run().unwrap_err();
        assert!(matches!(err, FittrackError::RangeMismatch { .. }));
    }

    #[test]
    fn test_unknown_layout_is_config_error() {
        let config = workbook_config(Category::Activities, &["Daily"], &["A1:D4"])
            .with_layout("weekly");
        let err = Pipeline::new(config).run().unwrap_err();
        assert!(matches!(err, FittrackError::Config(_)));
    }

    // ========== body ==========

    #[test]
    fn test_body_fixture_with_header() {
        let config = PipelineConfig::new(Category::Body, SourceSpec::Delimited(fixture("body.tsv")));
        let output = Pipeline::new(config).run().unwrap();
        let months = body(&output);

        assert_eq!(output.stats.rows_skipped, 1);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month.to_string(), "2024-03");
        assert!((months[0].weight - 72.0).abs() < 1e-9);
        assert!((months[0].body_fat.unwrap() - 21.0).abs() < 1e-9);
        assert_eq!(months[1].month.to_string(), "2024-04");
        assert_eq!(months[1].body_age, None);
    }

    #[test]
    fn test_body_fixture_positional() {
        let config = PipelineConfig::new(
            Category::Body,
            SourceSpec::Delimited(fixture("body-noheader.csv")),
        );
        let output = Pipeline::new(config).run().unwrap();
        let months = body(&output);

        assert_eq!(output.stats.rows_used, 3);
        assert_eq!(months.len(), 1);
        assert!((months[0].weight - 72.0).abs() < 1e-9);
        assert!((months[0].body_age.unwrap() - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_body_empty_grid() {
        let (months, stats) = aggregate_body(&[Vec::new()]);
        assert!(months.is_empty());
        assert_eq!(stats, IngestStats::default());
    }

    #[test]
    fn test_body_report_serializes_as_list() {
        let config = PipelineConfig::new(Category::Body, SourceSpec::Delimited(fixture("body.tsv")));
        let output = Pipeline::new(config).run().unwrap();
        let json = serde_json::to_value(&output.report).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["month"], "2024-03");
    }

    // ========== extract ==========

    #[test]
    fn test_extract_ranges() {
        let config = workbook_config(Category::Activities, &["Daily", "Monthly"], &["A1:B2", "A1:A1"]);
        let book = crate::sources::Workbook::open(&fixture("workbook.json")).unwrap();
        let grids = extract_ranges(&book, &config).unwrap();
        assert_eq!(grids["Daily"], vec![row(&["Date", "Walked"]), row(&["2023-01-02", "3,5"])]);
        assert_eq!(grids["Monthly"], vec![row(&["Month"])]);
    }
}
