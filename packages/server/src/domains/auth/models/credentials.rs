//! Sign-in form payloads and their validation rules.

use serde::Deserialize;

use crate::common::ValidationErrors;
use crate::domains::profiles::models::Role;

const PASSWORD_MESSAGE: &str = "Password must be at least 6 characters";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .email("email", &self.email)
            .min_chars("password", &self.password, 6, PASSWORD_MESSAGE);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .email("email", &self.email)
            .min_chars("password", &self.password, 6, PASSWORD_MESSAGE);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhoneOtpRequest {
    pub phone: String,
}

impl PhoneOtpRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.phone("phone", &self.phone);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhoneOtpVerification {
    pub phone: String,
    pub token: String,
}

impl PhoneOtpVerification {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.phone("phone", &self.phone).min_chars(
            "token",
            &self.token,
            6,
            "Verification code must be at least 6 characters",
        );
        errors.into_result()
    }
}
