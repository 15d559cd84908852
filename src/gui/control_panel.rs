//! Control Panel Widget
//! Left side panel: dataset selection, attendance year, county filter,
//! report actions and progress.

use crate::config::Settings;
use egui::{Color32, ComboBox, RichText};

/// Left side control panel with file selection and report controls.
pub struct ControlPanel {
    pub settings: Settings,
    pub counties: Vec<String>,
    pub selected_county: String,
    pub show_county_list: bool,
    pub show_top_list: bool,
    pub progress: f32,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            counties: Vec::new(),
            selected_county: String::new(),
            show_county_list: false,
            show_top_list: false,
            progress: 0.0,
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Update the county choices after a report build. The county set can
    /// change between sessions; a vanished selection falls back to the
    /// first available value.
    pub fn update_counties(&mut self, counties: Vec<String>) {
        self.counties = counties;
        if !self.counties.contains(&self.selected_county) {
            self.selected_county = self.counties.first().cloned().unwrap_or_default();
        }
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }

    fn file_row(
        ui: &mut egui::Ui,
        label: &str,
        path: Option<&std::path::PathBuf>,
    ) -> bool {
        let mut clicked = false;
        ui.horizontal(|ui| {
            ui.add_sized([78.0, 20.0], egui::Label::new(label));
            let path_text = path
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "No file selected".to_string());
            ui.label(RichText::new(path_text).size(12.0).color(if path.is_some() {
                Color32::WHITE
            } else {
                Color32::GRAY
            }));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("📂 Browse").clicked() {
                    clicked = true;
                }
            });
        });
        clicked
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏛 Heritage Dashboard")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Historic places & attendance")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Sources").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                if Self::file_row(ui, "Sites:", self.settings.sites_csv.as_ref()) {
                    action = ControlPanelAction::BrowseSites;
                }
                ui.add_space(4.0);
                if Self::file_row(ui, "Attendance:", self.settings.attendance_csv.as_ref()) {
                    action = ControlPanelAction::BrowseAttendance;
                }
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Attendance year:");
            ui.add(egui::DragValue::new(&mut self.settings.attendance_year).range(1800..=2100));
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== County Filter Section =====
        ui.label(RichText::new("🗺 Filter Data").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.label("Select a county:");
            ComboBox::from_id_salt("county_filter")
                .width(140.0)
                .selected_text(&self.selected_county)
                .show_ui(ui, |ui| {
                    for county in &self.counties {
                        if ui
                            .selectable_label(self.selected_county == *county, county)
                            .clicked()
                        {
                            self.selected_county = county.clone();
                        }
                    }
                });
        });

        ui.add_space(5.0);
        ui.checkbox(
            &mut self.show_county_list,
            "List historic places in this county",
        );
        ui.checkbox(&mut self.show_top_list, "List top visited places");

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        let build_enabled =
            self.settings.sites_csv.is_some() && self.settings.attendance_csv.is_some();
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(build_enabled, |ui| {
                let button = egui::Button::new(RichText::new("▶ Build Report").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::BuildReport;
                }
            });

            ui.add_space(8.0);

            let export_enabled = self.progress >= 100.0 && self.status.contains("Complete");
            ui.add_enabled_ui(export_enabled, |ui| {
                let export_button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(export_button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseSites,
    BrowseAttendance,
    BuildReport,
    ExportPng,
}
