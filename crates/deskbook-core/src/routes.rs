use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::error::DeskbookError;
use crate::models::Role;

/// Client-side route table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "route", content = "param")]
pub enum Route {
    Home,
    Auth,
    Profile,
    Meetings,
    UserConfirm(String),
    CheckQr(String),
    Admin,
    AdminBookingPlace(String),
    AdminUserControl,
    AdminTickets,
}

struct RoutePatterns {
    user_confirm: Regex,
    check_qr: Regex,
    admin_place: Regex,
}

fn patterns() -> Option<&'static RoutePatterns> {
    static PATTERNS: OnceLock<Option<RoutePatterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(RoutePatterns {
                user_confirm: Regex::new(r"^/userConfirm/([^/]+)$").ok()?,
                check_qr: Regex::new(r"^/checkQr/([^/]+)$").ok()?,
                admin_place: Regex::new(r"^/admin/booking/([^/]+)/place$").ok()?,
            })
        })
        .as_ref()
}

impl Route {
    /// Match a path, ignoring any query string and a trailing slash
    pub fn parse(path: &str) -> Result<Route, DeskbookError> {
        let unknown = || DeskbookError::UnknownRoute(path.to_string());
        let bare = path.split(['?', '#']).next().unwrap_or_default();
        let bare = if bare.len() > 1 {
            bare.trim_end_matches('/')
        } else {
            bare
        };

        let route = match bare {
            "" | "/" => Route::Home,
            "/auth" => Route::Auth,
            "/profile" => Route::Profile,
            "/meetings" => Route::Meetings,
            "/admin" => Route::Admin,
            "/admin/userControl" => Route::AdminUserControl,
            "/admin/tickets" => Route::AdminTickets,
            _ => {
                let p = patterns().ok_or_else(unknown)?;
                let capture = |re: &Regex| re.captures(bare).map(|c| c[1].to_string());
                if let Some(jwt) = capture(&p.user_confirm) {
                    Route::UserConfirm(jwt)
                } else if let Some(jwt) = capture(&p.check_qr) {
                    Route::CheckQr(jwt)
                } else if let Some(name) = capture(&p.admin_place) {
                    Route::AdminBookingPlace(name)
                } else {
                    return Err(unknown());
                }
            }
        };
        Ok(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Auth => "/auth".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Meetings => "/meetings".to_string(),
            Route::UserConfirm(jwt) => format!("/userConfirm/{}", jwt),
            Route::CheckQr(jwt) => format!("/checkQr/{}", jwt),
            Route::Admin => "/admin".to_string(),
            Route::AdminBookingPlace(name) => format!("/admin/booking/{}/place", name),
            Route::AdminUserControl => "/admin/userControl".to_string(),
            Route::AdminTickets => "/admin/tickets".to_string(),
        }
    }

    /// Reachable without a token
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Auth | Route::UserConfirm(_) | Route::CheckQr(_))
    }

    pub fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Route::Admin | Route::AdminBookingPlace(_) | Route::AdminUserControl | Route::AdminTickets
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteDecision {
    Allow,
    Redirect(Route),
}

/// Decide whether a navigation may proceed.
///
/// This only shapes the UI; the backend enforces every permission again.
pub fn guard(route: &Route, has_token: bool, role: Role) -> RouteDecision {
    if route.is_public() {
        return RouteDecision::Allow;
    }
    if !has_token {
        return RouteDecision::Redirect(Route::Auth);
    }
    if route.is_admin_only() && !role.is_admin() {
        return RouteDecision::Redirect(Route::Home);
    }
    RouteDecision::Allow
}
