pub mod bond;
pub mod user;

pub use bond::{Bond, BondDraft};
pub use user::{User, UserView};
