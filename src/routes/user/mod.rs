mod handler;
mod model;

pub use handler::{get_me, login, register, update_location_settings};
pub use model::{LocationSettingsUpdate, User, UserProfile};
