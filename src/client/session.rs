//! Authenticated browser session.

use std::sync::Arc;

use tracing::debug;

use crate::client::api::ApiClient;
use crate::client::notify::Notifier;
use crate::client::token_store::TokenStore;
use crate::model::user::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};

/// Holds who is signed in. The raw token lives only in the injected
/// [`TokenStore`]; this type keeps name and email.
pub struct AuthSession {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    authenticated: bool,
    loading: bool,
    user: Option<UserProfile>,
}

impl AuthSession {
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            tokens,
            notifier,
            authenticated: false,
            loading: false,
            user: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Startup session check. A persisted token either resolves to an
    /// identity or gets cleared; any failure leaves the session
    /// unauthenticated, never half-open.
    pub async fn connect(&mut self) {
        self.loading = true;

        if let Some(token) = self.tokens.load() {
            match self.api.get::<UserProfile>("/api/users/me", Some(&token)).await {
                Ok(profile) => {
                    self.user = Some(profile);
                    self.authenticated = true;
                }
                Err(e) => {
                    debug!("session check failed: {e}");
                    self.tokens.clear();
                }
            }
        }

        self.loading = false;
    }

    /// Returns whether the session ended up authenticated. Failures
    /// surface as a notification, not an error.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.api.post::<_, AuthResponse>("/api/users/login", &body, None).await {
            Ok(auth) => {
                self.establish(auth);
                self.notifier.success("Login successful!");
            }
            Err(e) => {
                debug!("login failed: {e}");
                self.notifier
                    .error("Failed to login. Please check your credentials.");
            }
        }

        self.authenticated
    }

    /// Registration signs the new user straight in: the register
    /// response already carries a token.
    pub async fn signup(&mut self, name: &str, email: &str, password: &str) -> bool {
        let body = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        match self
            .api
            .post::<_, AuthResponse>("/api/users/register", &body, None)
            .await
        {
            Ok(auth) => {
                self.establish(auth);
                self.notifier.success("Signup successful!");
            }
            Err(e) => {
                debug!("signup failed: {e}");
                self.notifier
                    .error("Failed to create an account. Please try again.");
            }
        }

        self.authenticated
    }

    pub fn logout(&mut self) {
        self.tokens.clear();
        self.user = None;
        self.authenticated = false;
        self.notifier.success("Logged out successfully");
    }

    fn establish(&mut self, auth: AuthResponse) {
        self.tokens.save(&auth.token);
        self.user = Some(UserProfile {
            id: auth.id,
            name: auth.name,
            email: auth.email,
        });
        self.authenticated = true;
    }
}
