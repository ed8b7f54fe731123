//! Sign-in and sign-out handlers.
//!
//! Credentials are verified by the remote auth provider; the dashboard
//! only stores the resulting identity (plus the role claim from the
//! profile table) in its own session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use tillpoint_core::{Email, Role};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::gateway::GatewayError;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::repos::ProfileRepository;
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Render the login page.
pub async fn login_page() -> LoginTemplate {
    LoginTemplate { error: None }
}

/// Verify credentials with the auth provider and start a session.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let Ok(email) = Email::parse(&form.email) else {
        return Ok(LoginTemplate {
            error: Some("Invalid email address".to_owned()),
        }
        .into_response());
    };

    let auth_user = match state.gateway().sign_in(email.as_str(), &form.password).await {
        Ok(user) => user,
        Err(GatewayError::InvalidCredentials) => {
            warn!("sign-in rejected");
            return Ok(LoginTemplate {
                error: Some("Invalid email or password".to_owned()),
            }
            .into_response());
        }
        Err(error) => return Err(error.into()),
    };

    // The role claim lives in the profile table, not the auth response.
    // A missing profile signs in as a cashier.
    let profile = ProfileRepository::new(state.gateway().as_ref())
        .get(auth_user.id)
        .await?;
    let (full_name, role) = profile.map_or((None, Role::Cashier), |p| {
        let role = p.role.as_deref().map_or(Role::Cashier, Role::from_claim);
        (p.full_name, role)
    });

    let user = CurrentUser {
        id: auth_user.id,
        email: auth_user.email,
        full_name,
        role,
    };

    set_current_user(&session, &user).await?;
    set_sentry_user(&user.id, Some(&user.email));
    info!(user_id = %user.id, %role, "signed in");

    Ok(Redirect::to("/").into_response())
}

/// End the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/auth/login"))
}
