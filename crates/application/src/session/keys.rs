//! Durable storage keys owned by the session.

/// Long-lived refresh credential.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Id of the user whose profile was last fetched.
pub const CURRENT_USER_ID_KEY: &str = "currentUserId";

/// Email entered during signup, kept until verification completes.
pub const SIGNUP_EMAIL_KEY: &str = "signupEmail";

/// Every key removed on logout.
pub const SESSION_KEYS: [&str; 3] = [REFRESH_TOKEN_KEY, CURRENT_USER_ID_KEY, SIGNUP_EMAIL_KEY];
