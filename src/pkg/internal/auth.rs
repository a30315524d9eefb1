use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use tokio::sync::OnceCell;
use validator::{Validate, ValidationError};

use crate::{
    conf::Settings,
    pkg::{
        internal::{
            access::Actor,
            adaptors::{
                professionals::spec::{ProfessionalEntry, ProfessionalType},
                tokens::spec::NewRefreshToken,
                users::spec::{Affiliation, NewUser, Role, UserEntry},
            },
        },
        server::state::AppState,
    },
    prelude::{Error, Result},
};

/// Token and hashing parameters, resolved once from settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub jwt_secret: String,
    pub access_ttl: i64,
    pub refresh_ttl: i64,
    pub bcrypt_cost: u32,
}

impl SessionConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        SessionConfig {
            jwt_secret: settings.jwt_secret.clone(),
            access_ttl: settings.jwt_expires_in,
            refresh_ttl: settings.jwt_refresh_expires_in,
            bcrypt_cost: settings.bcrypt_cost,
        }
    }

    #[cfg(test)]
    pub fn testing() -> Self {
        SessionConfig {
            jwt_secret: "test-secret".into(),
            access_ttl: 900,
            refresh_ttl: 604800,
            bcrypt_cost: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub kind: TokenKind,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 100))]
    pub password: String,
    pub user_type: Role,
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(custom(function = "validate_id_number"))]
    pub id_number: Option<String>,
    pub professional_type: Option<ProfessionalType>,
    pub license_number: Option<String>,
    pub hospital_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: Uuid,
    pub email: String,
    pub user_type: Role,
    pub name: String,
    pub phone: Option<String>,
    pub is_verified: bool,
}

impl From<&UserEntry> for UserSummary {
    fn from(user: &UserEntry) -> Self {
        UserSummary {
            user_id: user.id,
            email: user.email.clone(),
            user_type: user.role,
            name: user.name.clone(),
            phone: user.phone.clone(),
            is_verified: user.is_verified,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutput {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: UserSummary,
}

pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| Error::Internal(format!("hashing task failed: {}", e)))?
        .map_err(Error::from)
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| Error::Internal(format!("hashing task failed: {}", e)))?
        .map_err(Error::from)
}

fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Ten digits, as in `0912345678`.
pub fn validate_phone(value: &str) -> std::result::Result<(), ValidationError> {
    if value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("phone"))
    }
}

fn validate_id_number(value: &str) -> std::result::Result<(), ValidationError> {
    if is_id_number(value) {
        Ok(())
    } else {
        Err(ValidationError::new("id_number"))
    }
}

/// One uppercase letter, `1` or `2`, then eight digits.
fn is_id_number(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[0].is_ascii_uppercase()
        && matches!(bytes[1], b'1' | b'2')
        && bytes[2..].iter().all(u8::is_ascii_digit)
}

fn encode_token(session: &SessionConfig, user: &UserEntry, kind: TokenKind) -> Result<String> {
    let now = Utc::now().timestamp();
    let ttl = match kind {
        TokenKind::Access => session.access_ttl,
        TokenKind::Refresh => session.refresh_ttl,
    };
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        kind,
        jti: Uuid::new_v4(),
        iat: now,
        exp: now + ttl,
    };
    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(session.jwt_secret.as_bytes()),
    )?)
}

fn decode_token(session: &SessionConfig, token: &str, kind: TokenKind) -> Result<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(session.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "token rejected");
        Error::Unauthorized
    })?;
    if data.claims.kind != kind {
        tracing::warn!(expected = ?kind, got = ?data.claims.kind, "token kind mismatch");
        return Err(Error::Unauthorized);
    }
    Ok(data.claims)
}

async fn active_user(state: &AppState, user_id: Uuid) -> Result<UserEntry> {
    match state.store.find_user(user_id).await? {
        Some(user) if user.is_active => Ok(user),
        _ => {
            tracing::warn!(user = %user_id, "token subject missing or inactive");
            Err(Error::Unauthorized)
        }
    }
}

async fn issue_pair(state: &AppState, user: &UserEntry) -> Result<TokenPair> {
    let session = &state.session;
    let token = encode_token(session, user, TokenKind::Access)?;
    let refresh_token = encode_token(session, user, TokenKind::Refresh)?;
    state
        .store
        .insert_refresh_token(NewRefreshToken {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_hash: hash_token(&refresh_token),
            expires_at: Utc::now() + TimeDelta::seconds(session.refresh_ttl),
        })
        .await?;
    Ok(TokenPair {
        token,
        refresh_token,
        expires_in: session.access_ttl,
    })
}

pub async fn register(state: &AppState, input: RegisterInput) -> Result<Uuid> {
    input.validate()?;
    let email = input.email.trim().to_lowercase();
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(Error::Conflict("email already registered".into()));
    }

    let user_id = Uuid::new_v4();
    let affiliation = match input.user_type {
        Role::HealthcareProfessional => {
            let (Some(id_number), Some(professional_type), Some(license_number)) = (
                input.id_number,
                input.professional_type,
                input.license_number.filter(|l| !l.trim().is_empty()),
            ) else {
                return Err(Error::BadRequest(
                    "professionals must provide idNumber, professionalType and licenseNumber"
                        .into(),
                ));
            };
            Affiliation::Professional(ProfessionalEntry::new(
                user_id,
                id_number,
                professional_type,
                license_number,
            ))
        }
        Role::HospitalAdmin => {
            let code = input.hospital_code.ok_or_else(|| {
                Error::BadRequest("hospital admins must provide hospitalCode".into())
            })?;
            let hospital = state
                .store
                .find_hospital_by_code(&code)
                .await?
                .ok_or_else(|| Error::BadRequest(format!("unknown hospital code {}", code)))?;
            Affiliation::HospitalAdmin {
                hospital_id: hospital.id,
            }
        }
        Role::SystemAdmin => {
            return Err(Error::BadRequest(
                "userType must be healthcare_professional or hospital_admin".into(),
            ));
        }
    };

    let password_hash = hash_password(&input.password, state.session.bcrypt_cost).await?;
    let user = state
        .store
        .create_account(
            NewUser {
                id: user_id,
                email,
                password_hash,
                role: input.user_type,
                name: input.name,
                phone: Some(input.phone),
            },
            affiliation,
        )
        .await?;
    tracing::info!(user = %user.id, role = ?user.role, "registered account");
    Ok(user.id)
}

/// Creates a system admin. Only reachable from the command line.
pub async fn provision_system_admin(
    state: &AppState,
    email: &str,
    password: &str,
    name: &str,
) -> Result<Uuid> {
    let password_hash = hash_password(password, state.session.bcrypt_cost).await?;
    let user = state
        .store
        .create_account(
            NewUser {
                id: Uuid::new_v4(),
                email: email.trim().to_lowercase(),
                password_hash,
                role: Role::SystemAdmin,
                name: name.to_string(),
                phone: None,
            },
            Affiliation::None,
        )
        .await?;
    tracing::info!(user = %user.id, "provisioned system admin");
    Ok(user.id)
}

/// Stand-in hash verified when the email is unknown, so every login attempt
/// pays for one bcrypt verification.
static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

async fn dummy_hash(cost: u32) -> Result<&'static str> {
    let hash = DUMMY_HASH
        .get_or_try_init(|| hash_password("rural-staffing-placeholder", cost))
        .await?;
    Ok(hash.as_str())
}

pub async fn login(state: &AppState, input: LoginInput) -> Result<LoginOutput> {
    input.validate()?;
    let found = state.store.find_user_by_email(input.email.trim()).await?;
    let hash = match &found {
        Some(user) => user.password_hash.as_str(),
        None => dummy_hash(state.session.bcrypt_cost).await?,
    };
    let verified = verify_password(&input.password, hash).await?;
    let user = match found {
        Some(user) if verified && user.is_active => user,
        Some(user) => {
            tracing::warn!(user = %user.id, "login rejected: wrong password or inactive account");
            return Err(Error::Unauthorized);
        }
        None => {
            tracing::warn!("login rejected: unknown account");
            return Err(Error::Unauthorized);
        }
    };
    state.store.touch_last_login(user.id).await?;
    let tokens = issue_pair(state, &user).await?;
    tracing::info!(user = %user.id, "logged in");
    Ok(LoginOutput {
        tokens,
        user: UserSummary::from(&user),
    })
}

pub async fn refresh(state: &AppState, refresh_token: &str) -> Result<TokenPair> {
    let claims = decode_token(&state.session, refresh_token, TokenKind::Refresh)?;
    let stored = state
        .store
        .latest_active_refresh_token(claims.sub)
        .await?
        .ok_or(Error::Unauthorized)?;
    if stored.token_hash != hash_token(refresh_token) || stored.is_expired(Utc::now()) {
        tracing::warn!(user = %claims.sub, "refresh rejected: stale or expired token");
        return Err(Error::Unauthorized);
    }
    let user = active_user(state, claims.sub).await?;
    if !state.store.revoke_refresh_token(stored.id).await? {
        tracing::warn!(user = %claims.sub, "refresh rejected: token already used");
        return Err(Error::Unauthorized);
    }
    issue_pair(state, &user).await
}

pub async fn logout(state: &AppState, actor: &Actor) -> Result<()> {
    let revoked = state.store.revoke_user_refresh_tokens(actor.user_id).await?;
    tracing::info!(user = %actor.user_id, revoked, "logged out");
    Ok(())
}

/// Resolves a bearer access token to the active caller.
pub async fn authenticate(state: &AppState, token: &str) -> Result<Actor> {
    let claims = decode_token(&state.session, token, TokenKind::Access)?;
    let user = active_user(state, claims.sub).await?;
    tracing::debug!(user = %user.id, "authenticated");
    Ok(Actor {
        user_id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    })
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::pkg::internal::testing::{memory_state, professional_input};

    fn login_input(email: &str, password: &str) -> LoginInput {
        LoginInput {
            email: email.into(),
            password: password.into(),
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn test_wrong_password_and_inactive_look_the_same() -> Result<()> {
        let (state, store) = memory_state().await;
        let user_id = register(&state, professional_input("nurse@example.com", "A123456789")).await?;

        let wrong = login(&state, login_input("nurse@example.com", "not-the-password"))
            .await
            .unwrap_err();
        store.set_user_active(user_id, false).await;
        let inactive = login(&state, login_input("nurse@example.com", "password123"))
            .await
            .unwrap_err();

        assert!(matches!(wrong, Error::Unauthorized));
        assert!(matches!(inactive, Error::Unauthorized));
        assert_eq!(wrong.to_string(), inactive.to_string());
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_unknown_email_still_verifies_a_hash() -> Result<()> {
        let (state, _) = memory_state().await;
        let unknown = login(&state, login_input("ghost@example.com", "password123"))
            .await
            .unwrap_err();
        assert!(matches!(unknown, Error::Unauthorized));
        assert!(DUMMY_HASH.initialized());
        assert!(logs_contain("login rejected: unknown account"));
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_refresh_rejects_expired_and_deactivated() -> Result<()> {
        let (state, store) = memory_state().await;
        let user_id = register(&state, professional_input("exp@example.com", "L123456789")).await?;

        let first = login(&state, login_input("exp@example.com", "password123")).await?;
        store.expire_refresh_tokens(user_id).await;
        let err = refresh(&state, &first.tokens.refresh_token).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
        assert!(logs_contain("refresh rejected: stale or expired token"));

        let out = login(&state, login_input("exp@example.com", "password123")).await?;
        store.set_user_active(user_id, false).await;
        let err = refresh(&state, &out.tokens.refresh_token).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
        assert!(logs_contain("token subject missing or inactive"));
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_refresh_token_is_single_use() -> Result<()> {
        let (state, _) = memory_state().await;
        register(&state, professional_input("doc@example.com", "B123456789")).await?;
        let first = login(&state, login_input("doc@example.com", "password123")).await?;

        let second = refresh(&state, &first.tokens.refresh_token).await?;
        assert_ne!(second.refresh_token, first.tokens.refresh_token);
        let reused = refresh(&state, &first.tokens.refresh_token).await.unwrap_err();
        assert!(matches!(reused, Error::Unauthorized));

        refresh(&state, &second.refresh_token).await?;
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_token_kinds_are_not_interchangeable() -> Result<()> {
        let (state, _) = memory_state().await;
        register(&state, professional_input("kind@example.com", "C223456789")).await?;
        let out = login(&state, login_input("kind@example.com", "password123")).await?;

        assert!(authenticate(&state, &out.tokens.refresh_token).await.is_err());
        assert!(refresh(&state, &out.tokens.token).await.is_err());
        let actor = authenticate(&state, &out.tokens.token).await?;
        assert_eq!(actor.email, "kind@example.com");
        assert_eq!(actor.role, Role::HealthcareProfessional);
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_logout_revokes_refresh_tokens() -> Result<()> {
        let (state, _) = memory_state().await;
        register(&state, professional_input("out@example.com", "D123456789")).await?;
        let out = login(&state, login_input("out@example.com", "password123")).await?;
        let actor = authenticate(&state, &out.tokens.token).await?;

        logout(&state, &actor).await?;
        assert!(refresh(&state, &out.tokens.refresh_token).await.is_err());
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_register_rules() -> Result<()> {
        let (state, _) = memory_state().await;
        register(&state, professional_input("dup@example.com", "E123456789")).await?;

        let dup = register(&state, professional_input("DUP@example.com", "F123456789")).await;
        assert!(matches!(dup, Err(Error::Conflict(_))));

        let bad_id = register(&state, professional_input("id@example.com", "E323456789"))
            .await
            .unwrap_err();
        assert_eq!(bad_id.to_string(), "invalid input: id_number");

        let mut missing = professional_input("missing@example.com", "G123456789");
        missing.license_number = None;
        assert!(matches!(register(&state, missing).await, Err(Error::BadRequest(_))));

        let mut admin = professional_input("sys@example.com", "H123456789");
        admin.user_type = Role::SystemAdmin;
        assert!(matches!(register(&state, admin).await, Err(Error::BadRequest(_))));

        let mut unknown = professional_input("hosp@example.com", "J123456789");
        unknown.user_type = Role::HospitalAdmin;
        unknown.hospital_code = Some("NOPE".into());
        assert!(matches!(register(&state, unknown).await, Err(Error::BadRequest(_))));

        let mut phone = professional_input("phone@example.com", "K123456789");
        phone.phone = "12345".into();
        let err = register(&state, phone).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid input: phone");
        Ok(())
    }

    #[test]
    fn id_number_pattern() {
        assert!(is_id_number("A123456789"));
        assert!(is_id_number("Z200000000"));
        assert!(!is_id_number("a123456789"));
        assert!(!is_id_number("A323456789"));
        assert!(!is_id_number("A12345678"));
    }
}
