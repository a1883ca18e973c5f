pub mod avatars;
pub mod uploads;
pub mod video;
