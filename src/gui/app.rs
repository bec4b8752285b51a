//! Dashboard Main Application
//! Main window with sidebar menu and page view.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::{DataLoader, DatasetCache, Datasets};
use crate::gui::{PageAction, PageView, Sidebar, SidebarAction};
use egui::{FontData, FontDefinitions, FontFamily, SidePanel};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

const CJK_FONT: &str = "cjk";

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    cache: DatasetCache,
    datasets: Option<Arc<Datasets>>,
    load_error: Option<String>,
    sidebar: Sidebar,
    pages: PageView,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig, loader: DataLoader) -> Self {
        if let Some(font_path) = &config.font_path {
            Self::install_font(&cc.egui_ctx, font_path);
        }

        let cache = DatasetCache::new(loader);
        let sources = cache
            .loader()
            .source_paths()
            .iter()
            .map(|p| p.to_path_buf())
            .collect();

        let mut app = Self {
            config,
            cache,
            datasets: None,
            load_error: None,
            sidebar: Sidebar::new(sources),
            pages: PageView::new(),
        };
        app.refresh();
        app
    }

    /// Register a font file ahead of the defaults so Hangul glyphs render.
    fn install_font(ctx: &egui::Context, path: &Path) {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "font not loaded, using default fonts");
                return;
            }
        };

        let mut fonts = FontDefinitions::default();
        fonts
            .font_data
            .insert(CJK_FONT.to_owned(), FontData::from_owned(bytes).into());
        for family in [FontFamily::Proportional, FontFamily::Monospace] {
            fonts
                .families
                .entry(family)
                .or_default()
                .insert(0, CJK_FONT.to_owned());
        }
        ctx.set_fonts(fonts);
        info!(path = %path.display(), "font installed");
    }

    /// Pull datasets from the cache and update the status line.
    fn refresh(&mut self) {
        match self.cache.get() {
            Ok(datasets) => {
                self.sidebar.set_status(
                    &format!(
                        "Loaded CPI {} / USD {} / EUR {} points",
                        datasets.cpi.len(),
                        datasets.usd.len(),
                        datasets.eur.len()
                    ),
                    false,
                );
                self.datasets = Some(datasets);
                self.load_error = None;
            }
            Err(e) => {
                let source_file = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                error!(error = %e, source_file, "failed to load datasets");
                self.sidebar.set_status(&format!("Error: {e}"), true);
                self.datasets = None;
                self.load_error = Some(e.to_string());
            }
        }
        self.pages.clear();
    }

    fn handle_reload(&mut self) {
        info!("reload requested");
        self.cache.invalidate();
        self.refresh();
    }

    /// Handle PNG export of the comparison on screen
    fn handle_export_comparison(&mut self) {
        let Some(view) = self.pages.current_comparison().cloned() else {
            self.sidebar.set_status("No comparison to export", true);
            return;
        };

        // Ask user for output location
        let output_path = match rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("cpi_fx_comparison.png")
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        let export = &self.config.export;
        match StaticChartRenderer::render_comparison_png(
            &view,
            &output_path,
            export.width,
            export.height,
        ) {
            Ok(()) => {
                self.sidebar
                    .set_status(&format!("Chart exported: {}", output_path.display()), false);
                if export.open_after_export {
                    if let Err(e) = open::that(&output_path) {
                        warn!(path = %output_path.display(), error = %e, "could not open exported chart");
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "chart export failed");
                self.sidebar.set_status(&format!("Export error: {e}"), true);
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Sidebar
        SidePanel::left("sidebar")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.sidebar.show(ui) {
                        SidebarAction::Reload => self.handle_reload(),
                        SidebarAction::None => {}
                    }
                });
            });

        // Central panel - Page
        let mut page_action = PageAction::None;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let data = match &self.datasets {
                    Some(datasets) => Ok(datasets.as_ref()),
                    None => Err(self.load_error.as_deref().unwrap_or("Data not loaded")),
                };
                page_action = self.pages.show(ui, self.sidebar.page, data);
            });
        });

        if page_action == PageAction::ExportComparison {
            self.handle_export_comparison();
        }
    }
}
