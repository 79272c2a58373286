use axum::{async_trait, extract::FromRequest, http::Request, Json, RequestExt};
use validator::{Validate, ValidationError};

use super::AppError;

/// Custom validator function to check an otp code
pub fn validate_otp_code(otp: &str) -> Result<(), ValidationError> {
    if !otp.chars().all(|ch| ch.is_ascii_digit()) {
        let mut err = ValidationError::new("otp_code");
        err.message = Some("Verification code must be all digits".into());
        return Err(err);
    }

    Ok(())
}

/// Custom validator function to check that a phone number has something dialable
pub fn validate_phone_input(phone: &str) -> Result<(), ValidationError> {
    if !phone.chars().any(|ch| ch.is_ascii_digit()) {
        let mut err = ValidationError::new("phone_number");
        err.message =
            Some(format!("Phone must contain digits. Invalid phone received: {phone}").into());
        return Err(err);
    }

    Ok(())
}

/// JSON body extractor which runs the `validator` rules before the handler
pub struct ValidatedBody<T>(pub T);

#[async_trait]
impl<S, B, T> FromRequest<S, B> for ValidatedBody<T>
where
    B: Send + 'static,
    S: Send + Sync,
    T: Validate + 'static,
    Json<T>: FromRequest<(), B>,
{
    type Rejection = AppError;

    async fn from_request(req: Request<B>, _state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = req
            .extract::<Json<T>, _>()
            .await
            .map_err(|_| AppError::BadRequestErr("Invalid JSON body".into()))?;
        data.validate()
            .map_err(|err| AppError::BadRequestErr(err.to_string()))?;
        Ok(Self(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_otp_code() {
        assert!(validate_otp_code("482913").is_ok());
        assert!(validate_otp_code("48a913").is_err());
    }

    #[test]
    fn test_validate_phone_input() {
        assert!(validate_phone_input("0912 345 6789").is_ok());
        assert!(validate_phone_input("abc").is_err());
    }
}
