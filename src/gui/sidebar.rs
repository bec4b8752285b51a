//! Sidebar Widget
//! Left side panel with the page menu, data-source status and reload control.

use crate::gui::Page;
use egui::{Color32, RichText};
use std::path::PathBuf;

/// Left side menu panel.
pub struct Sidebar {
    pub page: Page,
    pub sources: Vec<PathBuf>,
    pub status: String,
    pub is_error: bool,
}

impl Sidebar {
    pub fn new(sources: Vec<PathBuf>) -> Self {
        Self {
            page: Page::default(),
            sources,
            status: "Ready".to_string(),
            is_error: false,
        }
    }

    pub fn set_status(&mut self, status: &str, is_error: bool) {
        self.status = status.to_string();
        self.is_error = is_error;
    }

    /// Draw the sidebar
    pub fn show(&mut self, ui: &mut egui::Ui) -> SidebarAction {
        let mut action = SidebarAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 대시보드 메뉴")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        for page in Page::ALL {
            ui.radio_value(&mut self.page, page, page.menu_label());
            ui.add_space(2.0);
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Sources").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                for path in &self.sources {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| path.display().to_string());
                    ui.label(RichText::new(name).size(12.0))
                        .on_hover_text(path.display().to_string());
                }
            });

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("🔄 Reload Data").size(14.0))
                .min_size(egui::vec2(150.0, 30.0));
            if ui.add(button).clicked() {
                action = SidebarAction::Reload;
            }
        });

        ui.add_space(10.0);

        let status_color = if self.is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by the sidebar
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarAction {
    None,
    Reload,
}
