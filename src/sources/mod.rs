pub mod sst;

pub use sst::{SstFetch, SstSource};
