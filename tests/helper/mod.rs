pub mod helper;

pub use helper::build_get_request;
pub use helper::build_post_request;
pub use helper::build_state;
pub use helper::MemoryUserStore;
pub use helper::RecordingSmsSender;
pub use helper::API_KEY;

pub use phone_verify_backend::models::GenericResponse;
