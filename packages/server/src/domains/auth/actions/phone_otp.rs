//! Phone one-time code actions

use tracing::info;

use super::sign_in::{landing_path, SignedIn};
use crate::common::AppError;
use crate::domains::auth::models::{PhoneOtpRequest, PhoneOtpVerification};
use crate::kernel::ServerDeps;

/// Ask the provider to text a one-time code to the phone number.
pub async fn send_phone_otp(form: PhoneOtpRequest, deps: &ServerDeps) -> Result<(), AppError> {
    form.validate()?;
    deps.auth.send_phone_otp(&form.phone).await?;
    info!("Phone sign-in code sent");
    Ok(())
}

pub async fn verify_phone_otp(
    form: PhoneOtpVerification,
    deps: &ServerDeps,
) -> Result<SignedIn, AppError> {
    form.validate()?;

    let session = deps.auth.verify_phone_otp(&form.phone, &form.token).await?;
    let next = landing_path(session.user.user_id, deps).await?;

    info!(user_id = %session.user.user_id, "Signed in with phone code");
    Ok(SignedIn { session, next })
}
