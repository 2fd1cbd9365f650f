//! Route guarding.
//!
//! The navigation surface is split into two regions: the auth screens
//! (sign-in/register) and the app screens (everything else). The decision
//! rule below is the contract every surface must preserve: signed-out
//! users are pushed to the auth region, signed-in users are pushed out of
//! it, and nothing moves while the session is still loading.

use crate::manager::AuthState;

/// Which region of the navigation tree the user is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRegion {
    /// Sign-in / registration screens.
    Auth,
    /// The authenticated application screens.
    App,
}

/// Where the surface must navigate, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// Send the user to the sign-in screen.
    ToLogin,
    /// Send the user to the home screen.
    ToHome,
}

/// Decide whether the current state and location require a redirect.
pub fn route_redirect(state: &AuthState, region: RouteRegion) -> Option<Redirect> {
    match (state, region) {
        // Never move while the persisted session is still being read.
        (AuthState::Loading, _) => None,
        (AuthState::Unauthenticated, RouteRegion::App) => Some(Redirect::ToLogin),
        (AuthState::Unauthenticated, RouteRegion::Auth) => None,
        (AuthState::Authenticated(_), RouteRegion::Auth) => Some(Redirect::ToHome),
        (AuthState::Authenticated(_), RouteRegion::App) => None,
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use feira_store::{SessionUser, User};

    fn signed_in() -> AuthState {
        let user = User::new("Ana", "ana@x.com", "abcdef");
        AuthState::Authenticated(SessionUser::from(&user))
    }

    #[test]
    fn loading_never_redirects() {
        assert_eq!(route_redirect(&AuthState::Loading, RouteRegion::Auth), None);
        assert_eq!(route_redirect(&AuthState::Loading, RouteRegion::App), None);
    }

    #[test]
    fn signed_out_in_app_region_goes_to_login() {
        assert_eq!(
            route_redirect(&AuthState::Unauthenticated, RouteRegion::App),
            Some(Redirect::ToLogin)
        );
    }

    #[test]
    fn signed_out_in_auth_region_stays() {
        assert_eq!(
            route_redirect(&AuthState::Unauthenticated, RouteRegion::Auth),
            None
        );
    }

    #[test]
    fn signed_in_in_auth_region_goes_home() {
        assert_eq!(
            route_redirect(&signed_in(), RouteRegion::Auth),
            Some(Redirect::ToHome)
        );
    }

    #[test]
    fn signed_in_in_app_region_stays() {
        assert_eq!(route_redirect(&signed_in(), RouteRegion::App), None);
    }
}
