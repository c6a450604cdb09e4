pub mod alert;
pub mod file;
pub mod gvision;
pub mod http;
pub mod v4l2;
