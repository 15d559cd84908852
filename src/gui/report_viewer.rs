//! Report Viewer Widget
//! Scrollable central panel rendering the report sections in a fixed
//! sequence: table preview, maps, county pie, registration curve,
//! attendance statistics and the top-10 ranking.

use crate::charts::{ChartPlotter, ReportData};
use egui::{Color32, RichText, ScrollArea};

const MAP_HEIGHT: f32 = 340.0;
const CHART_HEIGHT: f32 = 300.0;
const PREVIEW_ROWS: usize = 50;

/// Scrollable report display area.
pub struct ReportViewer {
    pub report: Option<ReportData>,
}

impl Default for ReportViewer {
    fn default() -> Self {
        Self { report: None }
    }
}

impl ReportViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.report = None;
    }

    pub fn set_report(&mut self, report: ReportData) {
        self.report = Some(report);
    }

    fn section_header(ui: &mut egui::Ui, title: &str) {
        ui.add_space(18.0);
        ui.label(RichText::new(title).size(17.0).strong());
        ui.add_space(6.0);
    }

    /// Draw the report. `county` is the sidebar selection for the filtered
    /// map; the two flags toggle the optional list views.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        county: &str,
        show_county_list: bool,
        show_top_list: bool,
    ) {
        let Some(report) = &self.report else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No report yet - pick the datasets and build").size(18.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(
                    RichText::new("National Register of Historic Places")
                        .size(22.0)
                        .strong(),
                );
                ui.label(
                    "Information about registered historic locations: where they \
                     are, when they were registered and how visited they were.",
                );

                Self::section_header(ui, "Table of Historic Places");
                ui.label(format!(
                    "{} places loaded (showing the first {}).",
                    report.site_count,
                    report.site_preview.len()
                ));
                Self::draw_preview_table(ui, report);

                Self::section_header(ui, "Map of All Historic Places");
                ChartPlotter::draw_site_map(ui, "map_all", &report.map_points, MAP_HEIGHT);

                Self::section_header(ui, &format!("Historic Places in {county} County"));
                let county_points: Vec<_> = report
                    .map_points
                    .iter()
                    .filter(|p| p.county == county)
                    .cloned()
                    .collect();
                ChartPlotter::draw_site_map(ui, "map_county", &county_points, MAP_HEIGHT);

                if show_county_list {
                    ui.add_space(6.0);
                    for point in &county_points {
                        ui.label(RichText::new(format!("• {}", point.name)).size(12.0));
                    }
                }

                Self::section_header(ui, "Share of Historic Places by County");
                ChartPlotter::draw_county_pie(ui, &report.county_counts);

                Self::section_header(ui, "Historic Places Registered Over Time");
                ui.label(
                    RichText::new("Excludes places without a registration date.")
                        .size(11.0)
                        .color(Color32::GRAY),
                );
                ChartPlotter::draw_registration_curve(ui, &report.registrations, CHART_HEIGHT);

                Self::section_header(ui, "Attendance - Descriptive Statistics");
                ui.label(
                    RichText::new("Attendance is not collected for every historic place.")
                        .size(11.0)
                        .color(Color32::GRAY),
                );
                ChartPlotter::draw_stats_table(ui, &report.attendance_stats);

                Self::section_header(ui, "Top 10 Most Visited Historic Places");
                ChartPlotter::draw_attendance_bars(ui, &report.top_attendance, CHART_HEIGHT);

                if show_top_list {
                    ui.add_space(6.0);
                    egui::Grid::new("top_attendance_list")
                        .striped(true)
                        .min_col_width(120.0)
                        .show(ui, |ui| {
                            ui.label(RichText::new("Resource Name").strong().size(12.0));
                            ui.label(RichText::new("County").strong().size(12.0));
                            ui.label(RichText::new("Attendance").strong().size(12.0));
                            ui.end_row();
                            for entry in &report.top_attendance {
                                ui.label(RichText::new(&entry.name).size(12.0));
                                ui.label(RichText::new(&entry.county).size(12.0));
                                ui.label(
                                    RichText::new(format!("{:.0}", entry.attendance)).size(12.0),
                                );
                                ui.end_row();
                            }
                        });
                }

                ui.add_space(24.0);
                ui.label(
                    RichText::new(
                        "\"Must I tell you that neither the Alps nor the Appenines, nor even \
                         Aetna itself, have dimmed, in my eyes, the beauty of our Catskills.\" \
                         - Thomas Cole",
                    )
                    .size(11.0)
                    .italics()
                    .color(Color32::GRAY),
                );
                ui.add_space(12.0);
            });
    }

    fn draw_preview_table(ui: &mut egui::Ui, report: &ReportData) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ScrollArea::horizontal()
                    .id_salt("site_preview_scroll")
                    .show(ui, |ui| {
                        egui::Grid::new("site_preview_table")
                            .striped(true)
                            .min_col_width(90.0)
                            .spacing([10.0, 3.0])
                            .show(ui, |ui| {
                                for header in &report.site_headers {
                                    ui.label(RichText::new(header).strong().size(11.0));
                                }
                                ui.end_row();
                                for row in report.site_preview.iter().take(PREVIEW_ROWS) {
                                    for value in row {
                                        ui.label(RichText::new(value).size(11.0));
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });
    }
}
