pub mod console_sidebar;
pub mod sidebar_display;
pub mod sidebar_panel;
pub mod sidebar_presenter;

pub use console_sidebar::ConsoleSidebar;
pub use sidebar_display::{DisplayError, SidebarDisplay};
pub use sidebar_panel::{SidebarPanel, SidebarTab};
pub use sidebar_presenter::SidebarPresenter;
