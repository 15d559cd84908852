//! Chart Plotter Module
//! Interactive report visualizations using egui_plot: point maps, the county
//! pie chart, the cumulative registrations line, the attendance bar chart
//! and the descriptive statistics table.

use crate::stats::SummaryStats;
use egui::{Color32, RichText, Sense, Shape, Stroke};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

/// Color palette for pie slices and bars
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(121, 85, 72),   // Brown
];

pub const MAP_POINT_COLOR: Color32 = Color32::from_rgb(52, 152, 219);

/// One mappable historic place. Coordinates stay optional; rows without
/// them are carried through and skipped at draw time.
#[derive(Debug, Clone)]
pub struct MapPoint {
    pub name: String,
    pub county: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl MapPoint {
    pub fn coords(&self) -> Option<[f64; 2]> {
        match (self.lon, self.lat) {
            (Some(lon), Some(lat)) => Some([lon, lat]),
            _ => None,
        }
    }
}

/// One row of the top-attendance ranking.
#[derive(Debug, Clone)]
pub struct TopEntry {
    pub name: String,
    pub county: String,
    pub attendance: f64,
}

/// Everything the report viewer needs, extracted from the derived tables.
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    pub site_count: usize,
    pub site_headers: Vec<String>,
    pub site_preview: Vec<Vec<String>>,
    pub map_points: Vec<MapPoint>,
    pub county_counts: Vec<(String, u32)>,
    pub registrations: Vec<(i32, u32)>,
    pub attendance_stats: SummaryStats,
    pub top_attendance: Vec<TopEntry>,
}

impl ReportData {
    /// County choices for the sidebar selector, in first-encounter order.
    pub fn counties(&self) -> Vec<String> {
        self.county_counts.iter().map(|(c, _)| c.clone()).collect()
    }
}

/// Creates the report charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn slice_color(idx: usize) -> Color32 {
        PALETTE[idx % PALETTE.len()]
    }

    /// Draw a point map of historic places. Rows without coordinates are
    /// skipped here, not upstream.
    pub fn draw_site_map(ui: &mut egui::Ui, id: &str, points: &[MapPoint], height: f32) {
        let plottable: PlotPoints = points.iter().filter_map(MapPoint::coords).collect();

        Plot::new(id.to_string())
            .height(height)
            .data_aspect(1.0)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(plottable)
                        .radius(2.5)
                        .color(MAP_POINT_COLOR)
                        .name("Historic places"),
                );
            });
    }

    /// Draw a pie chart of sites per county with a wrapped legend.
    pub fn draw_county_pie(ui: &mut egui::Ui, counts: &[(String, u32)]) {
        let total: u32 = counts.iter().map(|(_, c)| c).sum();
        if total == 0 {
            ui.label(RichText::new("No county data").color(Color32::GRAY));
            return;
        }

        let side = ui.available_width().min(360.0);
        let (rect, _) = ui.allocate_exact_size(egui::vec2(side, side), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = side * 0.45;

        // Fan of convex polygons, one per slice, starting at 12 o'clock
        let mut start = -std::f64::consts::FRAC_PI_2;
        for (idx, (_, count)) in counts.iter().enumerate() {
            let sweep = f64::from(*count) / f64::from(total) * std::f64::consts::TAU;
            let steps = ((sweep / 0.05).ceil() as usize).max(2);

            let mut vertices = vec![center];
            for s in 0..=steps {
                let angle = start + sweep * s as f64 / steps as f64;
                vertices.push(
                    center
                        + egui::vec2(
                            (angle.cos() * f64::from(radius)) as f32,
                            (angle.sin() * f64::from(radius)) as f32,
                        ),
                );
            }
            painter.add(Shape::convex_polygon(
                vertices,
                Self::slice_color(idx),
                Stroke::new(1.0, Color32::WHITE),
            ));
            start += sweep;
        }

        ui.add_space(8.0);
        ui.horizontal_wrapped(|ui| {
            for (idx, (county, count)) in counts.iter().enumerate() {
                let (swatch, _) =
                    ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                ui.painter().rect_filled(swatch, 2.0, Self::slice_color(idx));
                let pct = 100.0 * f64::from(*count) / f64::from(total);
                ui.label(RichText::new(format!("{county} ({pct:.1}%)")).size(11.0));
                ui.add_space(8.0);
            }
        });
    }

    /// Draw the cumulative registrations-over-time line.
    pub fn draw_registration_curve(ui: &mut egui::Ui, curve: &[(i32, u32)], height: f32) {
        let points: PlotPoints = curve
            .iter()
            .map(|&(year, total)| [f64::from(year), f64::from(total)])
            .collect();

        Plot::new("registration_curve")
            .height(height)
            .x_axis_label("Year")
            .y_axis_label("Registered historic places")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(points)
                        .color(Self::slice_color(0))
                        .width(2.0)
                        .name("Cumulative registrations"),
                );
            });
    }

    /// Draw the top-attendance bar chart, one bar per place.
    pub fn draw_attendance_bars(ui: &mut egui::Ui, entries: &[TopEntry], height: f32) {
        let bars: Vec<Bar> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                Bar::new(i as f64, e.attendance)
                    .width(0.75)
                    .fill(Self::slice_color(i))
                    .name(&e.name)
            })
            .collect();

        let labels: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();

        Plot::new("attendance_bars")
            .height(height)
            .x_axis_label("Historic place")
            .y_axis_label("Attendance")
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < 1e-6 {
                    labels.get(idx).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Draw the descriptive statistics table for attendance.
    pub fn draw_stats_table(ui: &mut egui::Ui, stats: &SummaryStats) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("attendance_stats_table")
                    .striped(true)
                    .min_col_width(80.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        let rows: [(&str, String); 8] = [
                            ("Count", stats.count.to_string()),
                            ("Mean", format!("{:.2}", stats.mean)),
                            ("Std", format!("{:.2}", stats.std)),
                            ("Min", format!("{:.2}", stats.min)),
                            ("25%", format!("{:.2}", stats.q1)),
                            ("50%", format!("{:.2}", stats.median)),
                            ("75%", format!("{:.2}", stats.q3)),
                            ("Max", format!("{:.2}", stats.max)),
                        ];
                        for (label, value) in rows {
                            ui.label(RichText::new(label).strong().size(12.0));
                            ui.label(RichText::new(value).size(12.0));
                            ui.end_row();
                        }
                    });
            });
    }
}
