pub mod notification;
pub mod photo;
pub mod stats;
pub mod tour;
pub mod user;
