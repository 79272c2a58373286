pub(crate) mod error_handler;
pub mod hash;
pub(crate) mod misc;
pub mod phone;
pub(crate) mod validation;

pub use error_handler::AppError;
pub use hash::{generate_salt, hash_otp};
pub use misc::*;
pub use phone::normalize_phone;
pub(crate) use validation::validate_otp_code;
pub(crate) use validation::validate_phone_input;
pub(crate) use validation::ValidatedBody;
