// Application state for HTTP handlers
use crate::application::dashboard_controller::DashboardHandle;
use crate::application::section_pages::SectionPages;

pub struct AppState {
    pub dashboard: DashboardHandle,
    pub pages: SectionPages,
}

impl AppState {
    /// Stop the dashboard timer and every section hook.
    pub fn unmount(&self) {
        self.dashboard.unmount();
        self.pages.unmount_all();
    }
}
