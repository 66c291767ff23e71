//! Route Table
//!
//! Static route configuration, defined once at startup.

use serde::Serialize;

use crate::client::EntityKind;

/// Page chrome a route renders inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Layout {
    /// Main dashboard shell with navigation sidebar
    Dashboard,
    /// Bare layout for the login screens
    Auth,
}

/// Access rules attached to a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    pub requires_auth: bool,
    /// Only reachable while logged out
    pub no_auth: bool,
    pub layout: Option<Layout>,
}

impl RouteMeta {
    pub const fn authenticated() -> Self {
        Self {
            requires_auth: true,
            no_auth: false,
            layout: Some(Layout::Dashboard),
        }
    }

    pub const fn guest_only() -> Self {
        Self {
            requires_auth: false,
            no_auth: true,
            layout: Some(Layout::Auth),
        }
    }

    pub const fn open() -> Self {
        Self {
            requires_auth: false,
            no_auth: false,
            layout: None,
        }
    }
}

/// What a route renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum View {
    Dashboard,
    /// Paginated record table for an entity
    Records(EntityKind),
    /// Placeholder for entities the dashboard does not display yet
    ComingSoon(EntityKind),
    Login,
    LoginCallback,
}

/// A single navigable route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
    pub meta: RouteMeta,
}

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const LOGIN_CALLBACK_PATH: &str = "/login-success";

static ROUTES: [Route; 11] = [
    Route {
        path: "/subscriptions",
        name: "Subscriptions",
        view: View::ComingSoon(EntityKind::Subscriptions),
        meta: RouteMeta::authenticated(),
    },
    Route {
        path: "/invoices",
        name: "Invoices",
        view: View::ComingSoon(EntityKind::Invoices),
        meta: RouteMeta::authenticated(),
    },
    Route {
        path: "/payments",
        name: "Payments",
        view: View::ComingSoon(EntityKind::Payments),
        meta: RouteMeta::authenticated(),
    },
    Route {
        path: "/quotes",
        name: "Quotes",
        view: View::ComingSoon(EntityKind::Quotes),
        meta: RouteMeta::authenticated(),
    },
    Route {
        path: LOGIN_PATH,
        name: "Login",
        view: View::Login,
        meta: RouteMeta::guest_only(),
    },
    Route {
        path: LOGIN_CALLBACK_PATH,
        name: "LoginCallback",
        view: View::LoginCallback,
        meta: RouteMeta::open(),
    },
    Route {
        path: HOME_PATH,
        name: "Dashboard",
        view: View::Dashboard,
        meta: RouteMeta::authenticated(),
    },
    Route {
        path: "/contacts",
        name: "Contacts",
        view: View::Records(EntityKind::Contacts),
        meta: RouteMeta::authenticated(),
    },
    Route {
        path: "/companies",
        name: "Companies",
        view: View::Records(EntityKind::Companies),
        meta: RouteMeta::authenticated(),
    },
    Route {
        path: "/deals",
        name: "Deals",
        view: View::Records(EntityKind::Deals),
        meta: RouteMeta::authenticated(),
    },
    Route {
        path: "/products",
        name: "Products",
        view: View::Records(EntityKind::Products),
        meta: RouteMeta::authenticated(),
    },
];

/// Every configured route
pub fn routes() -> &'static [Route] {
    &ROUTES
}

/// Match a location against the route table
///
/// Query strings and fragments are ignored, as is a trailing slash.
pub fn resolve(location: &str) -> Option<&'static Route> {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let path = match path.trim_end_matches('/') {
        "" => HOME_PATH,
        p => p,
    };

    ROUTES.iter().find(|r| r.path == path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_exact() {
        let route = resolve("/contacts").unwrap();
        assert_eq!(route.name, "Contacts");
        assert_eq!(route.view, View::Records(EntityKind::Contacts));
    }

    #[test]
    fn test_resolve_normalizes() {
        assert_eq!(resolve("").unwrap().name, "Dashboard");
        assert_eq!(resolve("/").unwrap().name, "Dashboard");
        assert_eq!(resolve("/deals/").unwrap().name, "Deals");
        assert_eq!(resolve("/login-success?token=abc").unwrap().name, "LoginCallback");
        assert_eq!(resolve("/companies#top").unwrap().name, "Companies");
    }

    #[test]
    fn test_resolve_unknown() {
        assert!(resolve("/settings").is_none());
        assert!(resolve("/contacts/42").is_none());
    }

    #[test]
    fn test_stub_routes_require_auth() {
        for path in ["/quotes", "/payments", "/invoices", "/subscriptions"] {
            let route = resolve(path).unwrap();
            assert!(matches!(route.view, View::ComingSoon(_)));
            assert!(route.meta.requires_auth);
        }
    }

    #[test]
    fn test_route_meta() {
        assert!(resolve(LOGIN_PATH).unwrap().meta.no_auth);
        assert_eq!(resolve(LOGIN_PATH).unwrap().meta.layout, Some(Layout::Auth));

        let callback = resolve(LOGIN_CALLBACK_PATH).unwrap().meta;
        assert!(!callback.requires_auth && !callback.no_auth);
        assert_eq!(callback.layout, None);
    }

    #[test]
    fn test_paths_unique() {
        let mut paths: Vec<_> = routes().iter().map(|r| r.path).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), routes().len());
    }
}
