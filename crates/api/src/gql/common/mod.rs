pub mod types;

pub use types::{PageInfo, PaginationInput};
