pub mod init;
pub mod notes;
pub mod play;
pub mod validate;
