//! Authentication API client methods

use super::{BukloadClient, ClientError};
use crate::types::{LoginRequest, SignupRequest, TokenPair};
use crate::validation::validate_signup;
use reqwest::Method;

impl BukloadClient {
    /// Log in and persist the issued token pair
    pub async fn login(
        &self,
        login_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<TokenPair, ClientError> {
        let request = LoginRequest {
            login_id: login_id.into(),
            password: password.into(),
        };
        let tokens: TokenPair = self
            .call_public(Method::POST, "/auth/login", &request)
            .await?;
        self.credentials().save(&tokens)?;
        info!(login_id = %request.login_id, "logged in");
        Ok(tokens)
    }

    /// Validate the form, create the account and persist the issued token pair
    pub async fn signup(&self, request: SignupRequest) -> Result<TokenPair, ClientError> {
        validate_signup(&request)?;
        let tokens: TokenPair = self
            .call_public(Method::POST, "/auth/signup", &request)
            .await?;
        self.credentials().save(&tokens)?;
        info!(login_id = %request.login_id, "account created");
        Ok(tokens)
    }

    /// Forget the stored tokens. No request is sent.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.credentials().clear()?;
        info!("logged out");
        Ok(())
    }

    /// Whether an access token is stored
    pub fn is_logged_in(&self) -> bool {
        self.credentials().access_token().is_some()
    }
}
