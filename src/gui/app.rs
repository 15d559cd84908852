//! Heritage Dashboard Main Application
//! Main window with control panel and report viewer. Source files load
//! synchronously through the memoized cache; the report itself is derived
//! on a background thread reporting through an mpsc channel.

use crate::charts::{MapPoint, ReportData, ReportRenderer, TopEntry};
use crate::data::transform;
use crate::data::{DatasetCache, TransformError};
use crate::stats::{StatsCalculator, SummaryStats};
use egui::SidePanel;
use polars::prelude::*;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::{error, info, warn};

use super::{ControlPanel, ControlPanelAction, ReportViewer};

const TOP_N: usize = 10;
const DATE_COLUMN: &str = "National Register Date";
const PREVIEW_LIMIT: usize = 50;

/// Report derivation result from the background thread
enum ReportResult {
    Progress(f32, String),
    Complete(Box<ReportData>),
    Error(String),
}

/// Main application window.
pub struct HeritageApp {
    cache: DatasetCache,
    control_panel: ControlPanel,
    report_viewer: ReportViewer,

    // Async report derivation
    report_rx: Option<Receiver<ReportResult>>,
    is_building: bool,
}

impl HeritageApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            cache: DatasetCache::new(),
            control_panel: ControlPanel::new(crate::config::Settings::load()),
            report_viewer: ReportViewer::new(),
            report_rx: None,
            is_building: false,
        }
    }

    fn save_settings(&self) {
        if let Err(e) = self.control_panel.settings.save() {
            warn!(error = %e, "could not persist settings");
        }
    }

    fn handle_browse_sites(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.control_panel.settings.sites_csv = Some(path);
            self.save_settings();
        }
    }

    fn handle_browse_attendance(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.control_panel.settings.attendance_csv = Some(path);
            self.save_settings();
        }
    }

    /// Load both datasets (cached after the first pass) and derive the
    /// report on a background thread.
    fn handle_build_report(&mut self) {
        let Some(sites_path) = self.control_panel.settings.sites_csv.clone() else {
            self.control_panel.set_progress(0.0, "No sites file selected");
            return;
        };
        let Some(attendance_path) = self.control_panel.settings.attendance_csv.clone() else {
            self.control_panel
                .set_progress(0.0, "No attendance file selected");
            return;
        };

        self.control_panel.set_progress(5.0, "Loading datasets...");

        // Local files, loaded synchronously; repeat builds hit the cache.
        let sites = match self.cache.load(&sites_path) {
            Ok(df) => df.clone(),
            Err(e) => {
                error!(error = %e, "sites load failed");
                self.control_panel.set_progress(0.0, &format!("Error: {e}"));
                return;
            }
        };
        let attendance = match self.cache.load(&attendance_path) {
            Ok(df) => df.clone(),
            Err(e) => {
                error!(error = %e, "attendance load failed");
                self.control_panel.set_progress(0.0, &format!("Error: {e}"));
                return;
            }
        };

        self.save_settings();

        let year = self.control_panel.settings.attendance_year;
        let (tx, rx) = channel();
        self.report_rx = Some(rx);
        self.is_building = true;
        self.control_panel.set_progress(15.0, "Deriving tables...");

        thread::spawn(move || {
            Self::run_derive(tx, sites, attendance, year);
        });
    }

    /// Derive the full report (called from the background thread).
    fn run_derive(tx: Sender<ReportResult>, sites: DataFrame, attendance: DataFrame, year: i32) {
        let _ = tx.send(ReportResult::Progress(
            30.0,
            "Deriving site and attendance tables...".to_string(),
        ));

        // The two pipelines are independent of each other
        let (site_part, attendance_part) = rayon::join(
            || Self::derive_site_tables(&sites),
            || Self::derive_attendance_tables(&attendance, year),
        );

        let (map_points, county_counts, registrations) = match site_part {
            Ok(parts) => parts,
            Err(e) => {
                let _ = tx.send(ReportResult::Error(e.to_string()));
                return;
            }
        };
        let (attendance_stats, top_attendance) = match attendance_part {
            Ok(parts) => parts,
            Err(e) => {
                let _ = tx.send(ReportResult::Error(e.to_string()));
                return;
            }
        };

        let _ = tx.send(ReportResult::Progress(
            80.0,
            "Assembling report...".to_string(),
        ));

        let (site_headers, site_preview) = Self::preview_rows(&sites, PREVIEW_LIMIT);

        info!(
            sites = sites.height(),
            counties = county_counts.len(),
            attendance_rows = attendance_stats.count,
            "report derived"
        );

        let report = ReportData {
            site_count: sites.height(),
            site_headers,
            site_preview,
            map_points,
            county_counts,
            registrations,
            attendance_stats,
            top_attendance,
        };

        let _ = tx.send(ReportResult::Complete(Box::new(report)));
    }

    /// Map points, county counts and the registration curve from the
    /// historic-sites table.
    #[allow(clippy::type_complexity)]
    fn derive_site_tables(
        df: &DataFrame,
    ) -> Result<(Vec<MapPoint>, Vec<(String, u32)>, Vec<(i32, u32)>), TransformError> {
        let geo = transform::project_geo(df)?;
        let map_points = Self::map_points_from(&geo)?;

        let county_counts = transform::count_by_county(df)?;

        let dated = transform::derive_registered_years(df, DATE_COLUMN)?;
        let years: Vec<i32> = dated
            .column("Register Year")?
            .i32()?
            .into_iter()
            .flatten()
            .collect();
        let registrations = StatsCalculator::cumulative_year_counts(&years);

        Ok((map_points, county_counts, registrations))
    }

    /// Summary statistics and the top-10 ranking from the attendance table.
    fn derive_attendance_tables(
        df: &DataFrame,
        year: i32,
    ) -> Result<(SummaryStats, Vec<TopEntry>), TransformError> {
        let normalized = transform::normalize_attendance(df, year)?;

        let values = StatsCalculator::column_values(&normalized, "Attendance");
        let stats = StatsCalculator::compute_summary(&values);

        let top = transform::top_n(&normalized, TOP_N, "Attendance")?;
        let entries = Self::top_entries_from(&top)?;

        Ok((stats, entries))
    }

    fn any_to_string(value: &AnyValue) -> String {
        if value.is_null() {
            String::new()
        } else {
            value.to_string().trim_matches('"').to_string()
        }
    }

    fn map_points_from(geo: &DataFrame) -> Result<Vec<MapPoint>, TransformError> {
        let names = geo.column("Resource Name")?;
        let counties = geo.column("County")?;
        let lat_f64 = geo.column("lat")?.cast(&DataType::Float64)?;
        let lat = lat_f64.f64()?;
        let lon_f64 = geo.column("lon")?.cast(&DataType::Float64)?;
        let lon = lon_f64.f64()?;

        let mut points = Vec::with_capacity(geo.height());
        for i in 0..geo.height() {
            points.push(MapPoint {
                name: Self::any_to_string(&names.get(i)?),
                county: Self::any_to_string(&counties.get(i)?),
                lat: lat.get(i),
                lon: lon.get(i),
            });
        }
        Ok(points)
    }

    fn top_entries_from(top: &DataFrame) -> Result<Vec<TopEntry>, TransformError> {
        let names = top.column("Resource Name")?;
        let counties = top.column("County")?;
        let attendance_f64 = top.column("Attendance")?.cast(&DataType::Float64)?;
        let attendance = attendance_f64.f64()?;

        let mut entries = Vec::with_capacity(top.height());
        for i in 0..top.height() {
            entries.push(TopEntry {
                name: Self::any_to_string(&names.get(i)?),
                county: Self::any_to_string(&counties.get(i)?),
                attendance: attendance.get(i).unwrap_or(0.0),
            });
        }
        Ok(entries)
    }

    /// Header names and the first `limit` rows as display strings.
    fn preview_rows(df: &DataFrame, limit: usize) -> (Vec<String>, Vec<Vec<String>>) {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let columns = df.get_columns();
        let rows = (0..df.height().min(limit))
            .map(|i| {
                columns
                    .iter()
                    .map(|col| {
                        col.get(i)
                            .map(|v| Self::any_to_string(&v))
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        (headers, rows)
    }

    /// Check for report derivation results
    fn check_report_results(&mut self) {
        let rx = self.report_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    ReportResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    ReportResult::Complete(report) => {
                        self.control_panel.update_counties(report.counties());
                        let counties = report.county_counts.len();
                        self.report_viewer.set_report(*report);
                        self.control_panel.set_progress(
                            100.0,
                            &format!("Complete! {counties} counties in the report"),
                        );
                        self.is_building = false;
                        should_keep_receiver = false;
                    }
                    ReportResult::Error(error) => {
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {error}"));
                        self.is_building = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.report_rx = Some(rx);
            }
        }
    }

    /// Export the current report charts as a PNG and open it.
    fn handle_export_png(&mut self) {
        let Some(report) = &self.report_viewer.report else {
            self.control_panel.set_progress(0.0, "No report to export");
            return;
        };

        let Some(output_path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("heritage_report.png")
            .save_file()
        else {
            return; // User cancelled
        };

        self.control_panel.set_progress(50.0, "Rendering report...");

        match ReportRenderer::export_png(report, &output_path, 1600, 1200) {
            Ok(()) => {
                self.control_panel.set_progress(
                    100.0,
                    &format!("Complete! Report saved to {}", output_path.display()),
                );
                if let Err(e) = open::that(&output_path) {
                    warn!(error = %e, "could not open exported report");
                }
            }
            Err(e) => {
                error!(error = %e, "report export failed");
                self.control_panel
                    .set_progress(0.0, &format!("Export error: {e}"));
            }
        }
    }
}

impl eframe::App for HeritageApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_report_results();

        if self.is_building {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseSites => self.handle_browse_sites(),
                        ControlPanelAction::BrowseAttendance => self.handle_browse_attendance(),
                        ControlPanelAction::BuildReport => {
                            if !self.is_building {
                                self.handle_build_report();
                            }
                        }
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Report Viewer
        let county = self.control_panel.selected_county.clone();
        let show_county_list = self.control_panel.show_county_list;
        let show_top_list = self.control_panel.show_top_list;
        egui::CentralPanel::default().show(ctx, |ui| {
            self.report_viewer
                .show(ui, &county, show_county_list, show_top_list);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites_fixture() -> DataFrame {
        df!(
            "Resource Name" => ["A", "B", "C"],
            "County" => ["Kings", "Kings", "Queens"],
            "Latitude" => [Some(40.1), None, Some(40.3)],
            "Longitude" => [Some(-73.9), None, Some(-73.8)],
            "National Register Date" => ["01/05/1975", "", "1980-03-10"],
        )
        .unwrap()
    }

    #[test]
    fn site_tables_cover_maps_counts_and_curve() {
        let (points, counts, curve) = HeritageApp::derive_site_tables(&sites_fixture()).unwrap();

        // All rows become map points; the one without coordinates is
        // unplottable but still listed under its county.
        assert_eq!(points.len(), 3);
        assert_eq!(points.iter().filter(|p| p.coords().is_some()).count(), 2);
        assert_eq!(
            counts,
            vec![("Kings".to_string(), 2), ("Queens".to_string(), 1)]
        );
        assert_eq!(curve, vec![(1975, 1), (1980, 2)]);
    }

    #[test]
    fn attendance_tables_cover_stats_and_ranking() {
        let df = df!(
            "Facility" => ["X", "Y", "Z"],
            "County" => ["Kings", "Queens", "Bronx"],
            "Year" => [2019, 2020, 2020],
            "Attendance" => [100, 500, 300],
        )
        .unwrap();

        let (stats, top) = HeritageApp::derive_attendance_tables(&df, 2020).unwrap();
        assert_eq!(stats.count, 2);
        assert!((stats.mean - 400.0).abs() < 1e-9);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Y");
        assert_eq!(top[0].attendance, 500.0);
    }

    #[test]
    fn preview_is_capped_and_null_safe() {
        let (headers, rows) = HeritageApp::preview_rows(&sites_fixture(), 2);
        assert_eq!(headers.len(), 5);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][2], ""); // null latitude renders empty
    }
}
