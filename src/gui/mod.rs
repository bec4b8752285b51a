//! GUI module - User interface components

mod app;
mod pages;
mod sidebar;

pub use app::DashboardApp;
pub use pages::{Page, PageAction, PageView};
pub use sidebar::{Sidebar, SidebarAction};
