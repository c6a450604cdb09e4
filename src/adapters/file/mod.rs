pub mod images;
pub mod replay;
pub mod snapshots;
