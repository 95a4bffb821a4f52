//! Registration action

use tracing::info;

use super::sign_in::SignedIn;
use crate::common::AppError;
use crate::domains::auth::models::RegistrationForm;
use crate::domains::auth::pkce::PkceChallenge;
use crate::domains::auth::types::{SignUpOutcome, SignUpRequest};
use crate::domains::profiles::actions::provision_from_metadata;
use crate::kernel::ServerDeps;

/// Callback path the confirmation e-mail links back to.
pub const CALLBACK_PATH: &str = "/auth/callback";

#[derive(Debug, Clone)]
pub enum Registered {
    /// The user must click the e-mailed link. The verifier has to survive
    /// until `/auth/callback` so the code can be exchanged.
    ConfirmationSent { code_verifier: String },
    SignedIn(SignedIn),
}

/// Create an account with the chosen role stored as sign-up metadata.
pub async fn register(form: RegistrationForm, deps: &ServerDeps) -> Result<Registered, AppError> {
    form.validate()?;

    let pkce = PkceChallenge::generate();
    let request = SignUpRequest {
        email: form.email,
        password: form.password,
        role: form.role,
        redirect_to: deps.site_path(CALLBACK_PATH),
        code_challenge: pkce.challenge,
    };

    match deps.auth.sign_up(&request).await? {
        SignUpOutcome::ConfirmationSent => {
            info!(role = %request.role, "Registration pending e-mail confirmation");
            Ok(Registered::ConfirmationSent {
                code_verifier: pkce.verifier,
            })
        }
        SignUpOutcome::SignedIn(session) => {
            info!(user_id = %session.user.user_id, role = %request.role, "Registered and signed in");
            let next = provision_from_metadata(&session.user, deps).await;
            Ok(Registered::SignedIn(SignedIn { session, next }))
        }
    }
}
