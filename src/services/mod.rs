pub mod bond_service;
pub mod user_service;

pub use bond_service::{BondService, BondServiceError};
pub use user_service::{AuthError, UserService};
