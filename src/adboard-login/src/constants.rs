//! Constants for the adboard-login crate.

/// Storage key of the bearer access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key of the refresh credential (the server's refresh cookie value).
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// File name of the credentials file inside the adboard home.
pub const CREDENTIALS_FILE: &str = "credentials.json";
