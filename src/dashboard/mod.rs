//! Interactive dashboard
//!
//! The view model is a pure function of the group selection; the server
//! only parses requests and serialises views.

pub mod page;
pub mod server;
pub mod view;

pub use server::{serve, DashboardState};
pub use view::{render_view, DashboardSettings, DashboardView, TestPanel};
