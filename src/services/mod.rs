//! Services separating file I/O from the processing pipeline

pub mod io;

pub use io::ImageIOService;
