pub mod catalog;
pub mod matcher;
pub mod tokenize;

pub use catalog::LinkCatalog;
pub use matcher::{jaccard, LinkMatch};
pub use tokenize::tokenize;
