//! Verification of hosted-auth access tokens.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    api::models::users::{CurrentUser, Role},
    config::Config,
    errors::Error,
    types::UserId,
};

/// Claims minted by the hosted auth service. Only the fields this tier needs
/// are modeled; everything else in the token is ignored.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: UserId,   // Subject (user ID)
    pub email: String, // User email
    pub exp: i64,      // Expiration time
    #[serde(default)]
    pub app_metadata: AppMetadata,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Server-controlled metadata; users cannot write to this block, which is why
/// the role lives here and not in `user_metadata`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppMetadata {
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl From<AccessClaims> for CurrentUser {
    fn from(claims: AccessClaims) -> Self {
        let role = match claims.app_metadata.role.as_deref() {
            Some("admin") | Some("administrator") => Role::Administrator,
            _ => Role::Standard,
        };
        Self {
            id: claims.sub,
            email: claims.email,
            display_name: claims.user_metadata.display_name,
            avatar_url: claims.user_metadata.avatar_url,
            role,
        }
    }
}

/// Verify and decode an access token issued by the hosted auth service.
pub fn verify_access_token(token: &str, config: &Config) -> Result<CurrentUser, Error> {
    let secret = config.auth.jwt_secret.as_ref().ok_or_else(|| Error::Internal {
        operation: "verify access token: auth.jwt_secret is not configured".to_string(),
    })?;

    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    // Hosted-auth tokens carry an audience claim we don't dispatch on
    validation.validate_aud = false;

    let token_data = decode::<AccessClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors (401) - malformed tokens, invalid claims, expired tokens
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::ExpiredSignature
        | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
        | jsonwebtoken::errors::ErrorKind::InvalidIssuer
        | jsonwebtoken::errors::ErrorKind::InvalidAudience
        | jsonwebtoken::errors::ErrorKind::InvalidSubject
        | jsonwebtoken::errors::ErrorKind::ImmatureSignature
        | jsonwebtoken::errors::ErrorKind::Base64(_)
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Error::Unauthenticated { message: None },

        // Server errors (500) - key issues, internal failures
        _ => Error::Internal {
            operation: format!("access token verification: {e}"),
        },
    })?;

    Ok(CurrentUser::from(token_data.claims))
}

#[cfg(test)]
pub(crate) fn mint_test_token(user_id: UserId, email: &str, role: Option<&str>, secret: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = AccessClaims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
        app_metadata: AppMetadata {
            role: role.map(str::to_string),
        },
        user_metadata: UserMetadata::default(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).expect("test token")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_config(secret: &str) -> Config {
        Config {
            auth: crate::config::AuthConfig {
                jwt_secret: Some(secret.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_verify_round_trip() {
        let config = test_config("test-secret");
        let user_id = Uuid::new_v4();
        let token = mint_test_token(user_id, "shopper@example.com", None, "test-secret");

        let user = verify_access_token(&token, &config).unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.email, "shopper@example.com");
        assert_eq!(user.role, Role::Standard);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_admin_role_comes_from_app_metadata() {
        let config = test_config("test-secret");
        let token = mint_test_token(Uuid::new_v4(), "ops@example.com", Some("admin"), "test-secret");

        let user = verify_access_token(&token, &config).unwrap();
        assert!(user.is_admin());
    }

    #[test]
    fn test_unknown_roles_fall_back_to_standard() {
        let config = test_config("test-secret");
        let token = mint_test_token(Uuid::new_v4(), "x@example.com", Some("superuser"), "test-secret");

        let user = verify_access_token(&token, &config).unwrap();
        assert_eq!(user.role, Role::Standard);
    }

    #[test]
    fn test_wrong_secret_is_unauthenticated() {
        let config = test_config("right-secret");
        let token = mint_test_token(Uuid::new_v4(), "x@example.com", None, "wrong-secret");

        let result = verify_access_token(&token, &config);
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated { .. }));
    }

    #[test]
    fn test_expired_token_is_unauthenticated() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let config = test_config("test-secret");
        let claims = AccessClaims {
            sub: Uuid::new_v4(),
            email: "x@example.com".to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp(),
            app_metadata: AppMetadata::default(),
            user_metadata: UserMetadata::default(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap();

        let result = verify_access_token(&token, &config);
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated { .. }));
    }

    #[test]
    fn test_malformed_tokens_are_unauthenticated() {
        let config = test_config("test-secret");
        for token in ["not.a.token", "invalid", ""] {
            let result = verify_access_token(token, &config);
            assert!(
                matches!(result.unwrap_err(), Error::Unauthenticated { .. }),
                "expected Unauthenticated for token: {token}"
            );
        }
    }

    #[test]
    fn test_missing_secret_is_internal_error() {
        let config = Config::default();
        let result = verify_access_token("whatever", &config);
        assert!(matches!(result.unwrap_err(), Error::Internal { .. }));
    }
}
