pub mod create_tag;
pub mod error;
pub mod validate;

pub use create_tag::*;
pub use error::*;
pub use validate::*;
