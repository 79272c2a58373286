pub mod otp;
pub mod status;
pub mod user;

pub use otp::send_code::send_code_handler;
pub use otp::verify_code::verify_code_handler;

pub use status::default_route_handler;
pub use status::global_404_handler;
pub use status::ping_handler;

pub use user::create::create_user_handler;
pub use user::get::get_user_handler;
