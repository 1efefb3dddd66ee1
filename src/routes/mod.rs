//! Application routes. `/dashboard` is the only guarded destination; it is
//! dispatched by role once the guard lets it through. Everything else falls
//! back to the login page.

use crate::features::auth::{GuardDecision, Role, Session, require_auth};
use std::fmt;

pub mod paths {
    pub const ROOT: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const DASHBOARD: &str = "/dashboard";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    /// Neutral placeholder while the session bootstrap runs.
    Loading,
    Login,
    TeamDashboard,
    UserDashboard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Show(Page),
    Redirect(&'static str),
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Page::Loading => "loading",
            Page::Login => "login",
            Page::TeamDashboard => "team dashboard",
            Page::UserDashboard => "user dashboard",
        })
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Navigation::Show(page) => write!(f, "show {page}"),
            Navigation::Redirect(target) => write!(f, "redirect {target}"),
        }
    }
}

/// Resolves a requested path against the current session.
#[must_use]
pub fn resolve(path: &str, session: &Session) -> Navigation {
    match normalize(path) {
        paths::LOGIN => Navigation::Show(Page::Login),
        paths::DASHBOARD => match require_auth(session, None) {
            GuardDecision::Wait => Navigation::Show(Page::Loading),
            GuardDecision::Redirect(target) => Navigation::Redirect(target),
            GuardDecision::Render => dashboard_for(session.role()),
        },
        _ => Navigation::Redirect(paths::LOGIN),
    }
}

/// Picks the dashboard matching the user's role.
fn dashboard_for(role: Option<Role>) -> Navigation {
    match role {
        Some(Role::Management | Role::Team) => Navigation::Show(Page::TeamDashboard),
        Some(Role::User) => Navigation::Show(Page::UserDashboard),
        Some(Role::Admin) | None => Navigation::Redirect(paths::LOGIN),
    }
}

fn normalize(path: &str) -> &str {
    let path = path.trim();
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { paths::ROOT } else { trimmed }
}
