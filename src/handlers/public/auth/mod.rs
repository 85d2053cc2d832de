// handlers/public/auth/mod.rs - Public authentication handlers

pub mod login;    // POST /api/token/ - exchange credentials for a token pair
pub mod refresh;  // POST /api/token/refresh/ - new access token from a refresh token
pub mod register; // POST /api/registration/ - create an account

pub use login::login_post;
pub use refresh::refresh_post;
pub use register::register_post;
