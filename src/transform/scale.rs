use std::num::NonZeroUsize;
use std::thread;

use crate::error::Error;
use crate::limits::{ColumnLimits, LimitsTable};
use crate::matcher::ColumnMatcher;
use crate::progress::{Progress, Stage};
use crate::report::{Action, AuditReport};
use crate::types::{ColumnValues, Dataset, Result};

/// Where the bounds of a scaling operation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsSource {
    /// Both bounds taken from the column's own min/max
    Data,
    /// The column has a limits entry; absent bounds fall back to the data
    Limits,
}

/// Resolved `[lo, hi]` range for one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBounds {
    pub lo: f64,
    pub hi: f64,
    pub source: BoundsSource,
}

impl ScaleBounds {
    pub fn action(&self) -> Action {
        match self.source {
            BoundsSource::Data => Action::ScaleDefault,
            BoundsSource::Limits => Action::ScaleCustom,
        }
    }

    pub fn details(&self) -> String {
        format!("[{},{}]", self.lo, self.hi)
    }

    /// `(v - lo) / (hi - lo)`. A zero-width range yields NaN or infinities.
    pub fn apply(&self, value: f64) -> f64 {
        (value - self.lo) / (self.hi - self.lo)
    }

    pub fn is_degenerate(&self) -> bool {
        self.hi == self.lo
    }
}

/// Min and max of the non-missing, non-NaN cells; NaN for an empty column
pub fn data_range(values: &[Option<f64>]) -> (f64, f64) {
    values
        .iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unwrap_or((f64::NAN, f64::NAN))
}

/// Pick the scaling range for a column from its data and optional limits
pub fn resolve_bounds(values: &[Option<f64>], limits: Option<ColumnLimits>) -> ScaleBounds {
    let (data_min, data_max) = data_range(values);
    match limits {
        Some(l) => ScaleBounds {
            lo: l.min.unwrap_or(data_min),
            hi: l.max.unwrap_or(data_max),
            source: BoundsSource::Limits,
        },
        None => ScaleBounds {
            lo: data_min,
            hi: data_max,
            source: BoundsSource::Data,
        },
    }
}

struct ScaleJob<'a> {
    index: usize,
    values: &'a ColumnValues,
    limits: Option<ColumnLimits>,
}

struct ScaleOutcome {
    index: usize,
    bounds: ScaleBounds,
    scaled: Option<Vec<Option<f64>>>,
}

fn run_job(job: &ScaleJob<'_>, dry_run: bool) -> Option<ScaleOutcome> {
    let values = job.values.as_f64()?;
    let bounds = resolve_bounds(&values, job.limits);
    let scaled = (!dry_run).then(|| {
        values
            .iter()
            .map(|v| v.map(|x| bounds.apply(x)))
            .collect()
    });
    Some(ScaleOutcome {
        index: job.index,
        bounds,
        scaled,
    })
}

/// Settings for the scale stage
#[derive(Debug, Clone, Copy)]
pub struct ScaleSettings<'a> {
    pub obfuscate: &'a ColumnMatcher,
    pub skip: &'a ColumnMatcher,
    pub limits: Option<&'a LimitsTable>,
    pub dry_run: bool,
    /// Upper bound on worker threads; `None` uses the available parallelism
    pub workers: Option<NonZeroUsize>,
}

/// Min/max scale every numeric column that is neither obfuscated nor skipped.
///
/// Columns are processed on worker threads and joined before anything is
/// recorded or written back, so either every column lands or none does.
/// Report entries follow column order regardless of completion order.
pub fn scale_numeric(
    dataset: &mut Dataset,
    settings: &ScaleSettings<'_>,
    report: &mut AuditReport,
    progress: &dyn Progress,
) -> Result<Vec<String>> {
    let mut outcomes = {
        let jobs: Vec<ScaleJob<'_>> = dataset
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.dtype().is_numeric())
            .filter(|(_, c)| !settings.obfuscate.matches(&c.name))
            .filter(|(_, c)| !settings.skip.matches(&c.name))
            .map(|(index, c)| ScaleJob {
                index,
                values: &c.values,
                limits: settings.limits.and_then(|l| l.lookup(&c.name)),
            })
            .collect();

        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let workers = settings
            .workers
            .or_else(|| thread::available_parallelism().ok())
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        let chunk_size = jobs.len().div_ceil(workers).max(1);
        let dry_run = settings.dry_run;

        let joined = thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .filter_map(|job| run_job(job, dry_run))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|h| {
                    h.join()
                        .map_err(|_| Error::Runtime("scaling worker panicked".to_string()))
                })
                .collect::<Result<Vec<_>>>()
        })?;
        joined.into_iter().flatten().collect::<Vec<_>>()
    };

    outcomes.sort_by_key(|o| o.index);

    let mut scaled_columns = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let column = &mut dataset.columns_mut()[outcome.index];
        if outcome.bounds.is_degenerate() {
            tracing::warn!(
                column = %column.name,
                bound = outcome.bounds.lo,
                "zero-width scaling range, values become NaN or infinite"
            );
        }
        report.record(outcome.bounds.action(), &column.name, outcome.bounds.details());
        progress.column(Stage::Scale, &column.name);
        if let Some(scaled) = outcome.scaled {
            column.values = ColumnValues::Numeric(scaled);
        }
        scaled_columns.push(column.name.clone());
    }

    Ok(scaled_columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Silent;
    use crate::types::Column;

    fn numeric(name: &str, values: &[f64]) -> Column {
        Column::new(
            name,
            ColumnValues::Numeric(values.iter().copied().map(Some).collect()),
        )
    }

    fn settings<'a>(
        obfuscate: &'a ColumnMatcher,
        skip: &'a ColumnMatcher,
        limits: Option<&'a LimitsTable>,
    ) -> ScaleSettings<'a> {
        ScaleSettings {
            obfuscate,
            skip,
            limits,
            dry_run: false,
            workers: None,
        }
    }

    fn values_of(dataset: &Dataset, name: &str) -> Vec<Option<f64>> {
        dataset.column(name).unwrap().values.as_f64().unwrap()
    }

    #[test]
    fn test_default_scaling() {
        let mut data = Dataset::new(vec![numeric("x", &[2.0, 4.0, 6.0])]).unwrap();
        let none = ColumnMatcher::default();
        let mut report = AuditReport::new();

        scale_numeric(&mut data, &settings(&none, &none, None), &mut report, &Silent).unwrap();

        assert_eq!(values_of(&data, "x"), vec![Some(0.0), Some(0.5), Some(1.0)]);
        assert_eq!(report.records()[0].action, Action::ScaleDefault);
        assert_eq!(report.records()[0].details, "[2,6]");
    }

    #[test]
    fn test_custom_limits() {
        let mut data = Dataset::new(vec![numeric("x", &[2.0, 4.0, 6.0])]).unwrap();
        let mut limits = LimitsTable::new();
        limits.insert(
            "x",
            ColumnLimits {
                min: Some(0.0),
                max: Some(10.0),
            },
        );
        let none = ColumnMatcher::default();
        let mut report = AuditReport::new();

        scale_numeric(&mut data, &settings(&none, &none, Some(&limits)), &mut report, &Silent)
            .unwrap();

        let scaled = values_of(&data, "x");
        let expected = [0.2, 0.4, 0.6];
        for (got, want) in scaled.iter().zip(expected) {
            assert!((got.unwrap() - want).abs() < 1e-12);
        }
        assert_eq!(report.records()[0].action, Action::ScaleCustom);
        assert_eq!(report.records()[0].details, "[0,10]");
    }

    #[test]
    fn test_partial_limits_fall_back_to_data() {
        let mut data = Dataset::new(vec![numeric("h", &[20.0, 60.0])]).unwrap();
        let mut limits = LimitsTable::new();
        limits.insert(
            "h",
            ColumnLimits {
                min: None,
                max: Some(100.0),
            },
        );
        let none = ColumnMatcher::default();
        let mut report = AuditReport::new();

        scale_numeric(&mut data, &settings(&none, &none, Some(&limits)), &mut report, &Silent)
            .unwrap();

        assert_eq!(report.records()[0].details, "[20,100]");
        assert_eq!(values_of(&data, "h"), vec![Some(0.0), Some(0.5)]);
    }

    #[test]
    fn test_skips_obfuscated_skipped_and_text_columns() {
        let mut data = Dataset::new(vec![
            numeric("site", &[1.0, 2.0]),
            numeric("year", &[2020.0, 2021.0]),
            Column::new(
                "label",
                ColumnValues::String(vec![Some("a".to_string()), Some("b".to_string())]),
            ),
            Column::new("count", ColumnValues::Integer(vec![Some(0), Some(4)])),
        ])
        .unwrap();
        let obfuscate = ColumnMatcher::new(&["site"]).unwrap();
        let skip = ColumnMatcher::new(&["year"]).unwrap();
        let mut report = AuditReport::new();

        let scaled =
            scale_numeric(&mut data, &settings(&obfuscate, &skip, None), &mut report, &Silent)
                .unwrap();

        assert_eq!(scaled, vec!["count"]);
        assert_eq!(values_of(&data, "site"), vec![Some(1.0), Some(2.0)]);
        assert_eq!(values_of(&data, "count"), vec![Some(0.0), Some(1.0)]);
    }

    #[test]
    fn test_report_follows_column_order_across_workers() {
        let columns: Vec<Column> = (0..16u32)
            .map(|i| numeric(&format!("c{i}"), &[0.0, f64::from(i + 1)]))
            .collect();
        let mut data = Dataset::new(columns).unwrap();
        let none = ColumnMatcher::default();
        let mut report = AuditReport::new();
        let mut s = settings(&none, &none, None);
        s.workers = NonZeroUsize::new(4);

        scale_numeric(&mut data, &s, &mut report, &Silent).unwrap();

        let names: Vec<&str> = report.records().iter().map(|r| r.column.as_str()).collect();
        let expected: Vec<String> = (0..16).map(|i| format!("c{i}")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_missing_cells_stay_missing() {
        let mut data = Dataset::new(vec![Column::new(
            "x",
            ColumnValues::Numeric(vec![Some(0.0), None, Some(4.0)]),
        )])
        .unwrap();
        let none = ColumnMatcher::default();
        let mut report = AuditReport::new();

        scale_numeric(&mut data, &settings(&none, &none, None), &mut report, &Silent).unwrap();

        assert_eq!(values_of(&data, "x"), vec![Some(0.0), None, Some(1.0)]);
    }

    #[test]
    fn test_zero_range_propagates_nan() {
        let mut data = Dataset::new(vec![numeric("flat", &[3.0, 3.0])]).unwrap();
        let none = ColumnMatcher::default();
        let mut report = AuditReport::new();

        scale_numeric(&mut data, &settings(&none, &none, None), &mut report, &Silent).unwrap();

        assert!(values_of(&data, "flat").iter().all(|v| v.unwrap().is_nan()));
    }

    #[test]
    fn test_dry_run_records_without_writing() {
        let original = Dataset::new(vec![numeric("x", &[2.0, 4.0])]).unwrap();
        let mut data = original.clone();
        let none = ColumnMatcher::default();
        let mut report = AuditReport::new();
        let mut s = settings(&none, &none, None);
        s.dry_run = true;

        scale_numeric(&mut data, &s, &mut report, &Silent).unwrap();

        assert_eq!(data, original);
        assert_eq!(report.records()[0].details, "[2,4]");
    }

    #[test]
    fn test_data_range_ignores_missing_and_nan() {
        assert_eq!(
            data_range(&[Some(3.0), None, Some(f64::NAN), Some(-1.0)]),
            (-1.0, 3.0)
        );
        let (lo, hi) = data_range(&[None]);
        assert!(lo.is_nan() && hi.is_nan());
    }
}
