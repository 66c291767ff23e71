//! Route-Guarded Navigation
//!
//! Maps locations to views and gates every transition on session state
//! before anything is fetched.
//!
//! | target route        | token present | outcome         |
//! |---------------------|---------------|-----------------|
//! | `requires_auth`     | no            | redirect `/login` |
//! | `no_auth`           | yes           | redirect `/`      |
//! | anything else       | either        | proceed           |

mod guard;
mod routes;

pub use guard::{guard, GuardDecision};
pub use routes::{
    resolve, routes, Layout, Route, RouteMeta, View, HOME_PATH, LOGIN_CALLBACK_PATH, LOGIN_PATH,
};

use serde::Serialize;

use crate::session::{StoreError, TokenStore};

/// Where a navigation request ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Navigation {
    /// The requested route is shown
    Arrived { route: &'static Route },
    /// The guard sent the user elsewhere
    Redirected {
        from: &'static Route,
        route: &'static Route,
    },
    NotFound,
}

impl Navigation {
    /// The route finally shown, if any
    pub fn route(&self) -> Option<&'static Route> {
        match self {
            Navigation::Arrived { route } | Navigation::Redirected { route, .. } => Some(route),
            Navigation::NotFound => None,
        }
    }

    pub fn view(&self) -> Option<View> {
        self.route().map(|r| r.view)
    }
}

/// Resolve `location` and apply the guard, following a redirect
///
/// Redirect targets always pass the guard under the same token state, so at
/// most one hop is taken.
pub fn navigate(location: &str, has_token: bool) -> Navigation {
    let Some(target) = resolve(location) else {
        tracing::debug!(location, "No route matches location");
        return Navigation::NotFound;
    };

    match guard(&target.meta, has_token) {
        GuardDecision::Proceed => Navigation::Arrived { route: target },
        GuardDecision::Redirect(to) => match resolve(to) {
            Some(route) => {
                tracing::info!(from = target.path, to = route.path, "Navigation redirected");
                Navigation::Redirected {
                    from: target,
                    route,
                }
            }
            None => Navigation::NotFound,
        },
    }
}

/// Navigate using the token currently held in `store`
pub fn navigate_with_store(store: &dyn TokenStore, location: &str) -> Result<Navigation, StoreError> {
    Ok(navigate(location, store.has_token()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EntityKind;
    use crate::session::MemoryTokenStore;

    #[test]
    fn test_protected_route_without_token() {
        let nav = navigate("/contacts", false);
        match nav {
            Navigation::Redirected { from, route } => {
                assert_eq!(from.path, "/contacts");
                assert_eq!(route.path, LOGIN_PATH);
            }
            other => panic!("expected redirect, got {:?}", other),
        }
        assert_eq!(nav.view(), Some(View::Login));
    }

    #[test]
    fn test_protected_route_with_token() {
        let nav = navigate("/contacts", true);
        assert_eq!(nav.view(), Some(View::Records(EntityKind::Contacts)));
        assert!(matches!(nav, Navigation::Arrived { .. }));
    }

    #[test]
    fn test_login_with_token_goes_home() {
        let nav = navigate("/login", true);
        assert!(matches!(nav, Navigation::Redirected { .. }));
        assert_eq!(nav.view(), Some(View::Dashboard));
    }

    #[test]
    fn test_login_callback_always_reachable() {
        assert_eq!(navigate("/login-success?token=x", false).view(), Some(View::LoginCallback));
        assert_eq!(navigate("/login-success", true).view(), Some(View::LoginCallback));
    }

    #[test]
    fn test_unknown_location() {
        assert_eq!(navigate("/reports", true), Navigation::NotFound);
        assert!(navigate("/reports", false).route().is_none());
    }

    #[test]
    fn test_navigate_with_store() {
        let store = MemoryTokenStore::new();
        let nav = navigate_with_store(&store, "/deals").unwrap();
        assert_eq!(nav.view(), Some(View::Login));

        store.save("abc").unwrap();
        let nav = navigate_with_store(&store, "/deals").unwrap();
        assert_eq!(nav.view(), Some(View::Records(EntityKind::Deals)));
    }
}
