pub mod format;

pub use format::{bond_to_view, bonds_to_views, BondView};
