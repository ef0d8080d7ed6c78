use tracing::info;

use crate::api::client::ApiClient;
use crate::api::types::{AuthResponse, Credentials};
use crate::error::{Error, Result};
use crate::models::User;
use crate::session::AuthScope;
use crate::validation::{validate_credentials, LandlordForm, SignUpForm};

/// Account flows. Successful sign-ins are written into the session.
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a renter account. Returns the user when the backend signs
    /// them in straight away.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<Option<User>> {
        let body = form.validate()?;
        let response: AuthResponse = self
            .client
            .post(&["auth", "signup"], &body, AuthScope::User)
            .await?;
        self.remember(response)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        validate_credentials(email, password)?;
        let body = Credentials {
            email: email.trim(),
            password,
        };
        let response: AuthResponse = self
            .client
            .post(&["auth", "signin"], &body, AuthScope::User)
            .await?;
        self.remember(response)?.ok_or_else(|| Error::Server {
            status: 200,
            message: "Sign-in response did not include an account".to_string(),
        })
    }

    pub async fn register_landlord(&self, form: &LandlordForm) -> Result<Option<User>> {
        let body = form.validate()?;
        let response: AuthResponse = self
            .client
            .post(&["auth", "landlord", "register"], &body, AuthScope::User)
            .await?;
        self.remember(response)
    }

    pub fn sign_out(&self) -> Result<()> {
        self.client.session().sign_out()?;
        info!("Signed out");
        Ok(())
    }

    /// Admin login is separate from user sign-in and only yields a token.
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<()> {
        validate_credentials(email, password)?;
        let body = Credentials {
            email: email.trim(),
            password,
        };
        let response: AuthResponse = self
            .client
            .post(&["admin", "login"], &body, AuthScope::Admin)
            .await?;

        match response.token.filter(|t| !t.is_empty()) {
            Some(token) => {
                self.client.session().admin_sign_in(&token)?;
                info!("Admin signed in");
                Ok(())
            }
            None => Err(Error::Server {
                status: 200,
                message: response.message.unwrap_or_default(),
            }),
        }
    }

    fn remember(&self, response: AuthResponse) -> Result<Option<User>> {
        match (response.token, response.user) {
            (Some(token), Some(user)) if !token.is_empty() => {
                self.client.session().sign_in(user.clone(), &token)?;
                info!("Signed in as {}", user.email);
                Ok(Some(user))
            }
            _ => Ok(None),
        }
    }
}
