//! Payload transforms
//!
//! - [`combine`]: inline every included file into the first one
//! - [`readable`]: nested map view keyed by directive

mod combine;
mod readable;

pub use combine::combine;
pub use readable::{readable, Readable, ReadableInfo};
