pub mod images;
pub mod slb;
