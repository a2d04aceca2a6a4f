pub mod object_type;
pub mod request;
pub mod tags;

pub use object_type::*;
pub use request::*;
pub use tags::*;
