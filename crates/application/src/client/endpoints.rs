//! Backend routes.

/// Exchange credentials for a token pair.
pub const LOGIN: &str = "/api/auth/login";
/// Exchange a refresh token for a new token pair.
pub const REFRESH: &str = "/api/auth/refresh";
/// Revoke the refresh token server side.
pub const LOGOUT: &str = "/api/auth/logout";
/// Create an account.
pub const REGISTER: &str = "/api/auth/register";

/// Profile of the signed-in user.
pub const CURRENT_USER: &str = "/api/users/me";
/// Trusted contact of the signed-in user.
pub const TRUSTED_CONTACT: &str = "/api/users/me/trusted-contact";

/// Linked funding sources.
pub const PAYMENT_METHODS: &str = "/api/payment-methods";
/// Plaid Link token.
pub const PLAID_LINK_TOKEN: &str = "/api/plaid/link-token";
/// Plaid public token exchange.
pub const PLAID_LINK: &str = "/api/plaid/link";

/// Investments of the signed-in user.
pub const INVESTMENTS: &str = "/api/investments";
/// Suffix moving a draft to review.
pub const SUBMIT_SUFFIX: &str = "/submit";

/// All users (admin).
pub const ADMIN_USERS: &str = "/api/admin/users";
/// All investments (admin).
pub const ADMIN_INVESTMENTS: &str = "/api/admin/investments";
/// Suffix approving an investment.
pub const APPROVE_SUFFIX: &str = "/approve";
/// Suffix rejecting an investment.
pub const REJECT_SUFFIX: &str = "/reject";

/// Routes that never carry a bearer and never trigger a refresh on 401.
///
/// A 401 from these means bad credentials, not an expired session.
pub const CREDENTIAL_ROUTES: [&str; 3] = [LOGIN, REFRESH, REGISTER];

/// Returns true if `route` exchanges credentials.
#[must_use]
pub fn is_credential_route(route: &str) -> bool {
    CREDENTIAL_ROUTES.contains(&route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_routes() {
        assert!(is_credential_route("/api/auth/login"));
        assert!(is_credential_route("/api/auth/refresh"));
        assert!(!is_credential_route("/api/auth/logout"));
        assert!(!is_credential_route("/api/users/me"));
    }
}
