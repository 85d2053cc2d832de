pub mod session;
pub mod user;

pub use session::logout_post;
pub use user::user_get;
