pub mod avatar;
pub mod user;
pub mod video_job;

pub use avatar::Avatar;
pub use user::User;
pub use video_job::{JobStatus, VideoJob};
