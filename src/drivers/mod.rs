pub mod hc06;
pub mod serial;
