//! Dataset Transform Module
//! The five table transformations the report is derived from: attendance
//! normalization, geo projection, county counting, register-year derivation
//! and top-N ranking. Every function returns a new DataFrame; loaded source
//! frames are never mutated.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("required column '{0}' is missing")]
    MissingColumn(String),
    #[error("date column '{0}' is missing")]
    DateColumnMissing(String),
    #[error("column '{0}' is not numeric")]
    NonNumericColumn(String),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Date formats accepted for `National Register Date` values. The source
/// files mix slash- and dash-separated dates, month-first and year-first.
const DATE_FORMATS: [&str; 4] = ["%m/%d/%Y", "%m-%d-%Y", "%Y-%m-%d", "%Y/%m/%d"];

fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<(), TransformError> {
    for &name in columns {
        if df.column(name).is_err() {
            return Err(TransformError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Filter attendance records to a single year and align the schema with the
/// historic-sites table (`Facility` becomes `Resource Name`).
///
/// An empty result is not an error; a missing required column is.
pub fn normalize_attendance(df: &DataFrame, year: i32) -> Result<DataFrame, TransformError> {
    require_columns(df, &["Year", "Facility", "County", "Attendance"])?;

    let out = df
        .clone()
        .lazy()
        .filter(col("Year").eq(lit(year)))
        .select([
            col("Facility").alias("Resource Name"),
            col("County"),
            col("Attendance"),
        ])
        .collect()?;

    debug!(year, rows = out.height(), "normalized attendance");
    Ok(out)
}

/// Project the historic-sites table down to the columns the map needs,
/// renaming the coordinates to the `lat`/`lon` pair map widgets expect.
///
/// Rows with null coordinates pass through unchanged; skipping unplottable
/// rows is the map's job.
pub fn project_geo(df: &DataFrame) -> Result<DataFrame, TransformError> {
    require_columns(df, &["Resource Name", "County", "Latitude", "Longitude"])?;

    let out = df
        .clone()
        .lazy()
        .select([
            col("Resource Name"),
            col("County"),
            col("Latitude").alias("lat"),
            col("Longitude").alias("lon"),
        ])
        .collect()?;

    Ok(out)
}

/// Count historic sites per county in a single pass, keeping counties in
/// first-encounter order. Null counties create no entry.
pub fn count_by_county(df: &DataFrame) -> Result<Vec<(String, u32)>, TransformError> {
    let counties = df
        .column("County")
        .map_err(|_| TransformError::MissingColumn("County".to_string()))?;

    let mut order: Vec<String> = Vec::new();
    let mut counts: Vec<u32> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for i in 0..counties.len() {
        let val = counties.get(i)?;
        if val.is_null() {
            continue;
        }
        let name = val.to_string().trim_matches('"').to_string();
        match index.get(&name) {
            Some(&slot) => counts[slot] += 1,
            None => {
                index.insert(name.clone(), order.len());
                order.push(name);
                counts.push(1);
            }
        }
    }

    Ok(order.into_iter().zip(counts).collect())
}

fn parse_register_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Drop rows without a registration date, parse the rest and append an i32
/// `Register Year` column. Rows whose date parses under no accepted format
/// are excluded, not fatal; only a missing date column fails the operation.
pub fn derive_registered_years(
    df: &DataFrame,
    date_column: &str,
) -> Result<DataFrame, TransformError> {
    let dates = df
        .column(date_column)
        .map_err(|_| TransformError::DateColumnMissing(date_column.to_string()))?;
    let dates_str = dates.cast(&DataType::String)?;
    let dates_ca = dates_str.str()?;

    let mut keep: Vec<bool> = Vec::with_capacity(df.height());
    let mut years: Vec<i32> = Vec::new();

    for raw in dates_ca.into_iter() {
        match raw.and_then(parse_register_date) {
            Some(date) => {
                keep.push(true);
                years.push(date.year());
            }
            None => keep.push(false),
        }
    }

    let excluded = df.height() - years.len();
    if excluded > 0 {
        debug!(excluded, column = date_column, "rows without a parsable date");
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let mut out = df.filter(&mask)?;
    out.with_column(Column::new("Register Year".into(), years))?;
    Ok(out)
}

/// Up to `n` rows with the largest values of `column`, descending. Ties keep
/// their relative input order; fewer than `n` rows returns them all.
pub fn top_n(df: &DataFrame, n: usize, column: &str) -> Result<DataFrame, TransformError> {
    let ranked = df
        .column(column)
        .map_err(|_| TransformError::MissingColumn(column.to_string()))?;
    if !is_numeric(ranked.dtype()) {
        return Err(TransformError::NonNumericColumn(column.to_string()));
    }

    let out = df
        .clone()
        .lazy()
        .sort(
            [column],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true)
                .with_nulls_last(true),
        )
        .limit(n as IdxSize)
        .collect()?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites_fixture() -> DataFrame {
        df!(
            "Resource Name" => ["A", "B", "C"],
            "County" => ["Kings", "Kings", "Queens"],
            "Latitude" => [40.1, 40.2, 40.3],
            "Longitude" => [-73.9, -74.0, -73.8],
            "National Register Date" => ["01/05/1975", "", "1980-03-10"],
        )
        .unwrap()
    }

    fn attendance_fixture() -> DataFrame {
        df!(
            "Facility" => ["X", "Y", "Z"],
            "County" => ["Kings", "Queens", "Bronx"],
            "Year" => [2019, 2020, 2020],
            "Attendance" => [100, 500, 300],
        )
        .unwrap()
    }

    #[test]
    fn normalize_attendance_filters_and_renames() {
        let out = normalize_attendance(&attendance_fixture(), 2020).unwrap();
        assert_eq!(out.height(), 2);
        let columns: Vec<String> = out
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(columns, ["Resource Name", "County", "Attendance"]);
        let names = out.column("Resource Name").unwrap();
        assert_eq!(names.get(0).unwrap().to_string().trim_matches('"'), "Y");
        assert_eq!(names.get(1).unwrap().to_string().trim_matches('"'), "Z");
    }

    #[test]
    fn normalize_attendance_with_no_matching_year_is_empty() {
        let out = normalize_attendance(&attendance_fixture(), 1999).unwrap();
        assert_eq!(out.height(), 0);
    }

    #[test]
    fn normalize_attendance_requires_the_schema() {
        let df = df!("Facility" => ["X"], "Attendance" => [1]).unwrap();
        let err = normalize_attendance(&df, 2020).unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn(ref c) if c == "Year"));
    }

    #[test]
    fn project_geo_preserves_rows_and_values() {
        let df = sites_fixture();
        let out = project_geo(&df).unwrap();
        assert_eq!(out.height(), df.height());
        let columns: Vec<String> = out
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(columns, ["Resource Name", "County", "lat", "lon"]);

        let lat = out.column("lat").unwrap().f64().unwrap();
        let orig = df.column("Latitude").unwrap().f64().unwrap();
        for i in 0..df.height() {
            assert_eq!(lat.get(i), orig.get(i));
        }
    }

    #[test]
    fn project_geo_passes_null_coordinates_through() {
        let df = df!(
            "Resource Name" => ["A", "B"],
            "County" => ["Kings", "Kings"],
            "Latitude" => [Some(40.1), None],
            "Longitude" => [Some(-73.9), None],
        )
        .unwrap();
        let out = project_geo(&df).unwrap();
        assert_eq!(out.height(), 2);
        assert!(out.column("lat").unwrap().f64().unwrap().get(1).is_none());
    }

    #[test]
    fn project_geo_rejects_missing_columns() {
        let df = df!("Resource Name" => ["A"], "County" => ["Kings"]).unwrap();
        assert!(matches!(
            project_geo(&df).unwrap_err(),
            TransformError::MissingColumn(_)
        ));
    }

    #[test]
    fn county_counts_follow_encounter_order_and_sum_to_rows() {
        let counts = count_by_county(&sites_fixture()).unwrap();
        assert_eq!(
            counts,
            vec![("Kings".to_string(), 2), ("Queens".to_string(), 1)]
        );
        let total: u32 = counts.iter().map(|(_, c)| c).sum();
        assert_eq!(total as usize, sites_fixture().height());
    }

    #[test]
    fn county_counts_skip_null_counties() {
        let df = df!(
            "County" => [Some("Kings"), None, Some("Queens"), Some("Kings")],
        )
        .unwrap();
        let counts = count_by_county(&df).unwrap();
        assert_eq!(
            counts,
            vec![("Kings".to_string(), 2), ("Queens".to_string(), 1)]
        );
        let total: u32 = counts.iter().map(|(_, c)| c).sum();
        assert_eq!(total, 3); // three rows carry a county
    }

    #[test]
    fn derive_registered_years_excludes_unparsable_rows() {
        let out = derive_registered_years(&sites_fixture(), "National Register Date").unwrap();
        assert_eq!(out.height(), 2); // row B has no date
        let years = out.column("Register Year").unwrap().i32().unwrap();
        assert_eq!(years.get(0), Some(1975));
        assert_eq!(years.get(1), Some(1980));
    }

    #[test]
    fn derive_registered_years_accepts_both_separators() {
        let df = df!(
            "National Register Date" => ["06/30/1966", "06-30-1966", "1966/06/30", "garbage"],
        )
        .unwrap();
        let out = derive_registered_years(&df, "National Register Date").unwrap();
        assert_eq!(out.height(), 3);
        let years = out.column("Register Year").unwrap().i32().unwrap();
        for i in 0..3 {
            assert_eq!(years.get(i), Some(1966));
        }
    }

    #[test]
    fn derive_registered_years_drops_null_dates() {
        let df = df!(
            "National Register Date" => [Some("01/05/1975"), None],
        )
        .unwrap();
        let out = derive_registered_years(&df, "National Register Date").unwrap();
        assert_eq!(out.height(), 1);
    }

    #[test]
    fn derive_registered_years_fails_only_on_a_missing_column() {
        let df = df!("County" => ["Kings"]).unwrap();
        assert!(matches!(
            derive_registered_years(&df, "National Register Date").unwrap_err(),
            TransformError::DateColumnMissing(_)
        ));
    }

    #[test]
    fn top_n_sorts_descending_and_caps_at_row_count() {
        let df = attendance_fixture();
        let out = top_n(&df, 10, "Attendance").unwrap();
        assert_eq!(out.height(), 3);
        let vals = out.column("Attendance").unwrap().i32().unwrap();
        assert_eq!(vals.get(0), Some(500));
        assert_eq!(vals.get(1), Some(300));
        assert_eq!(vals.get(2), Some(100));
    }

    #[test]
    fn top_n_is_stable_under_ties() {
        let df = df!(
            "Facility" => ["a", "b", "c", "d"],
            "Attendance" => [5, 3, 5, 1],
        )
        .unwrap();
        let out = top_n(&df, 3, "Attendance").unwrap();
        let names = out.column("Facility").unwrap();
        let got: Vec<String> = (0..out.height())
            .map(|i| names.get(i).unwrap().to_string().trim_matches('"').to_string())
            .collect();
        assert_eq!(got, ["a", "c", "b"]); // equal 5s keep input order
    }

    #[test]
    fn top_n_rejects_missing_or_non_numeric_columns() {
        let df = attendance_fixture();
        assert!(matches!(
            top_n(&df, 1, "Visitors").unwrap_err(),
            TransformError::MissingColumn(_)
        ));
        assert!(matches!(
            top_n(&df, 1, "Facility").unwrap_err(),
            TransformError::NonNumericColumn(_)
        ));
    }

    #[test]
    fn filtered_attendance_scenario_end_to_end() {
        let filtered = normalize_attendance(&attendance_fixture(), 2020).unwrap();
        assert_eq!(filtered.height(), 2);
        let best = top_n(&filtered, 1, "Attendance").unwrap();
        assert_eq!(best.height(), 1);
        assert_eq!(
            best.column("Attendance").unwrap().i32().unwrap().get(0),
            Some(500)
        );
    }
}
