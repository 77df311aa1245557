pub mod handler;
pub mod model;

pub use handler::{create_guest, delete_guest, list_guests, update_invitation};
