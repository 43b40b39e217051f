mod handler;
mod model;

pub use handler::{create_photo, like_photo, list_photos, unlike_photo, user_photos};
pub use model::Photo;
