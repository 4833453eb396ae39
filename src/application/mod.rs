// Application layer - use cases over the record store and file storage.
// Every write runs in its own transaction; a dropped transaction rolls back.

pub mod companies;
pub mod documents;
pub mod error;
pub mod reporting;

pub use companies::*;
pub use documents::*;
pub use error::*;
pub use reporting::*;
