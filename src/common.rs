pub mod error;
pub mod pagination;
pub mod response;
pub mod slug;
pub mod validation;
