//! Navigation Guard
//!
//! Runs before every route transition and decides whether the target may be
//! shown. Only token presence is considered; contents and expiry are not.

use serde::Serialize;

use super::routes::{RouteMeta, HOME_PATH, LOGIN_PATH};

/// Outcome of guarding a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "snake_case")]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

/// Decide a transition to a route with `meta`
pub fn guard(meta: &RouteMeta, has_token: bool) -> GuardDecision {
    if meta.requires_auth && !has_token {
        GuardDecision::Redirect(LOGIN_PATH)
    } else if meta.no_auth && has_token {
        GuardDecision::Redirect(HOME_PATH)
    } else {
        GuardDecision::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(requires_auth: bool, no_auth: bool) -> RouteMeta {
        RouteMeta {
            requires_auth,
            no_auth,
            layout: None,
        }
    }

    #[test]
    fn test_decision_table() {
        let cases = [
            // (requires_auth, no_auth, has_token, expected)
            (false, false, false, GuardDecision::Proceed),
            (false, false, true, GuardDecision::Proceed),
            (true, false, false, GuardDecision::Redirect(LOGIN_PATH)),
            (true, false, true, GuardDecision::Proceed),
            (false, true, false, GuardDecision::Proceed),
            (false, true, true, GuardDecision::Redirect(HOME_PATH)),
            // Contradictory metadata: the auth check wins
            (true, true, false, GuardDecision::Redirect(LOGIN_PATH)),
            (true, true, true, GuardDecision::Redirect(HOME_PATH)),
        ];

        for (requires_auth, no_auth, has_token, expected) in cases {
            assert_eq!(
                guard(&meta(requires_auth, no_auth), has_token),
                expected,
                "requires_auth={} no_auth={} has_token={}",
                requires_auth,
                no_auth,
                has_token
            );
        }
    }

    #[test]
    fn test_decision_serializes() {
        let value = serde_json::to_value(GuardDecision::Redirect(LOGIN_PATH)).unwrap();
        assert_eq!(value, serde_json::json!({"decision": "redirect", "to": "/login"}));
    }
}
