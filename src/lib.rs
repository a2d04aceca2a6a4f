pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export command types
pub use logic::{
    BulkCreateCustomTagsCommand, CreateCustomTagCommand, CreateCustomTagWithRelationshipsCommand, InvalidField,
    TagCommandError, ValidationErrors, ValidationFailure,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{
    MemoryTagStore, PostgresTagStore, StoreError, StoreResult, TagStore, TagTransaction,
};
