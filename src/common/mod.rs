pub mod dates;
pub mod fanout;
pub mod filters;
pub mod labels;
pub mod pagination;
pub mod response;
pub mod roles;

pub use filters::{like_pattern, Filters};
pub use pagination::{page_offset, Pagination};
pub use response::{JsonResponse, FAIL_RESPONSE_CODE, SUCCESS_RESPONSE_CODE};
