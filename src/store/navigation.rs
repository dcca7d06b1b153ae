// SPDX-License-Identifier: MIT

//! Client-side navigation hook

/// Route shown after the session ends
pub const LOGIN_ROUTE: &str = "/login";

/// Receives navigation requests triggered by store side effects
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator that only records the request in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: &str) {
        log::info!("Navigating to {}", route);
    }
}
