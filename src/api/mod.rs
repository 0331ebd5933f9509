//! Request plumbing shared by every resource handler.

pub mod extract;
pub mod filter;
pub mod pagination;
pub mod validate;

pub use extract::ValidJson;
pub use filter::DateRange;
pub use pagination::{paginate, Page, PageRequest, Pagination};
pub use validate::Validator;
