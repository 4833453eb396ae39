mod company;
mod document;
mod ledger;
mod money;
mod validators;

pub use company::*;
pub use document::*;
pub use ledger::*;
pub use money::*;
pub use validators::*;
