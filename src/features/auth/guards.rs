use super::{state::Session, types::Role};
use crate::routes::paths;

/// What navigation to a guarded destination should do right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Bootstrap still running; show a neutral waiting state.
    Wait,
    Redirect(&'static str),
    Render,
}

/// Gate for a destination, optionally restricted to one role. Re-evaluated on
/// every navigation; it keeps no state of its own.
///
/// UX-only guard; real access control must live on the API.
#[must_use]
pub fn require_auth(session: &Session, require_role: Option<Role>) -> GuardDecision {
    if session.is_loading() {
        return GuardDecision::Wait;
    }

    let Some(user) = session.user() else {
        return GuardDecision::Redirect(paths::LOGIN);
    };

    match require_role {
        // Authorization failure, not authentication: stay inside the app.
        Some(role) if user.role != role => GuardDecision::Redirect(paths::DASHBOARD),
        _ => GuardDecision::Render,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::types::User;

    const ROLES: [Role; 4] = [Role::Management, Role::Team, Role::User, Role::Admin];

    fn session_for(role: Role) -> Session {
        Session::signed_in(User {
            id: "1".to_string(),
            email: "a@b.com".to_string(),
            name: "Ada".to_string(),
            nickname: String::new(),
            avatar: None,
            profile_picture: None,
            role,
            totp_enabled: false,
        })
    }

    #[test]
    fn loading_never_redirects() {
        let session = Session::loading();
        assert_eq!(require_auth(&session, None), GuardDecision::Wait);
        for role in ROLES {
            assert_eq!(require_auth(&session, Some(role)), GuardDecision::Wait);
        }
    }

    #[test]
    fn anonymous_goes_to_login() {
        let session = Session::anonymous();
        assert_eq!(
            require_auth(&session, None),
            GuardDecision::Redirect(paths::LOGIN)
        );
        assert_eq!(
            require_auth(&session, Some(Role::Team)),
            GuardDecision::Redirect(paths::LOGIN)
        );
    }

    #[test]
    fn wrong_role_goes_to_dashboard_not_login() {
        let session = session_for(Role::User);
        assert_eq!(
            require_auth(&session, Some(Role::Team)),
            GuardDecision::Redirect(paths::DASHBOARD)
        );
    }

    #[test]
    fn matching_or_absent_role_renders() {
        for role in ROLES {
            let session = session_for(role);
            assert_eq!(require_auth(&session, None), GuardDecision::Render);
            assert_eq!(require_auth(&session, Some(role)), GuardDecision::Render);
        }
    }
}
