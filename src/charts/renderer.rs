//! Static Report Renderer
//! Renders the four headline charts (site map, cumulative registrations,
//! county ranking, top-attendance bars) into a single PNG with plotters.

use crate::charts::{MapPoint, ReportData};
use anyhow::{anyhow, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

const PANEL_CAPTION: (&str, u32) = ("sans-serif", 22);

pub struct ReportRenderer;

impl ReportRenderer {
    /// Render the report into a 2x2 PNG at `path`.
    pub fn export_png(data: &ReportData, path: &Path, width: u32, height: u32) -> Result<()> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow!("fill background: {e}"))?;

        let panels = root.split_evenly((2, 2));
        Self::draw_map(&panels[0], &data.map_points)?;
        Self::draw_registration_curve(&panels[1], &data.registrations)?;
        Self::draw_county_bars(&panels[2], &data.county_counts)?;
        Self::draw_attendance_bars(&panels[3], data)?;

        root.present().map_err(|e| anyhow!("write PNG: {e}"))?;
        Ok(())
    }

    fn draw_map<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        points: &[MapPoint],
    ) -> Result<()> {
        let coords: Vec<(f64, f64)> = points
            .iter()
            .filter_map(|p| p.coords().map(|[lon, lat]| (lon, lat)))
            .collect();
        if coords.is_empty() {
            return Ok(());
        }

        let (x_range, y_range) = padded_ranges(&coords);
        let mut chart = ChartBuilder::on(area)
            .caption("All Historic Places", PANEL_CAPTION)
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| anyhow!("map axes: {e}"))?;

        chart
            .configure_mesh()
            .x_desc("Longitude")
            .y_desc("Latitude")
            .draw()
            .map_err(|e| anyhow!("map mesh: {e}"))?;

        chart
            .draw_series(
                coords
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 2, BLUE.filled())),
            )
            .map_err(|e| anyhow!("map points: {e}"))?;
        Ok(())
    }

    fn draw_registration_curve<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        curve: &[(i32, u32)],
    ) -> Result<()> {
        if curve.is_empty() {
            return Ok(());
        }
        let first = f64::from(curve[0].0);
        let last = f64::from(curve[curve.len() - 1].0);
        let top = f64::from(curve[curve.len() - 1].1) * 1.05;

        let mut chart = ChartBuilder::on(area)
            .caption("Registrations Over Time", PANEL_CAPTION)
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(50)
            .build_cartesian_2d(first..last, 0.0..top)
            .map_err(|e| anyhow!("curve axes: {e}"))?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("Registered places")
            .x_label_formatter(&|v| format!("{}", v.round() as i64))
            .draw()
            .map_err(|e| anyhow!("curve mesh: {e}"))?;

        chart
            .draw_series(LineSeries::new(
                curve
                    .iter()
                    .map(|&(year, total)| (f64::from(year), f64::from(total))),
                BLUE.stroke_width(2),
            ))
            .map_err(|e| anyhow!("curve line: {e}"))?;
        Ok(())
    }

    fn draw_county_bars<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        counts: &[(String, u32)],
    ) -> Result<()> {
        if counts.is_empty() {
            return Ok(());
        }

        // Largest counties first; cap the panel at twelve bars
        let mut ranked = counts.to_vec();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(12);

        let names: Vec<String> = ranked.iter().map(|(c, _)| c.clone()).collect();
        let max = f64::from(ranked.iter().map(|(_, c)| *c).max().unwrap_or(1));

        let mut chart = ChartBuilder::on(area)
            .caption("Historic Places by County", PANEL_CAPTION)
            .margin(10)
            .x_label_area_size(60)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..ranked.len() as f64, 0.0..max * 1.1)
            .map_err(|e| anyhow!("county axes: {e}"))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Sites")
            .x_labels(names.len())
            .x_label_formatter(&move |v| {
                let idx = v.floor() as usize;
                names.get(idx).cloned().unwrap_or_default()
            })
            .draw()
            .map_err(|e| anyhow!("county mesh: {e}"))?;

        chart
            .draw_series(ranked.iter().enumerate().map(|(i, (_, count))| {
                Rectangle::new(
                    [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, f64::from(*count))],
                    Palette99::pick(i).filled(),
                )
            }))
            .map_err(|e| anyhow!("county bars: {e}"))?;
        Ok(())
    }

    fn draw_attendance_bars<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        data: &ReportData,
    ) -> Result<()> {
        let entries = &data.top_attendance;
        if entries.is_empty() {
            return Ok(());
        }

        let names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        let max = entries
            .iter()
            .map(|e| e.attendance)
            .fold(f64::MIN, f64::max)
            .max(1.0);

        let mut chart = ChartBuilder::on(area)
            .caption("Most Visited Historic Places", PANEL_CAPTION)
            .margin(10)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..entries.len() as f64, 0.0..max * 1.1)
            .map_err(|e| anyhow!("attendance axes: {e}"))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Attendance")
            .x_labels(names.len())
            .x_label_formatter(&move |v| {
                let idx = v.floor() as usize;
                names.get(idx).cloned().unwrap_or_default()
            })
            .draw()
            .map_err(|e| anyhow!("attendance mesh: {e}"))?;

        chart
            .draw_series(entries.iter().enumerate().map(|(i, e)| {
                Rectangle::new(
                    [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, e.attendance)],
                    Palette99::pick(i).filled(),
                )
            }))
            .map_err(|e| anyhow!("attendance bars: {e}"))?;
        Ok(())
    }
}

fn padded_ranges(coords: &[(f64, f64)]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for &(x, y) in coords {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    let x_pad = ((x_max - x_min) * 0.05).max(0.01);
    let y_pad = ((y_max - y_min) * 0.05).max(0.01);
    (
        (x_min - x_pad)..(x_max + x_pad),
        (y_min - y_pad)..(y_max + y_pad),
    )
}
