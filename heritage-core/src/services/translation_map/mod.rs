pub mod fill;
pub mod store;
pub mod translator;

pub use fill::{fill, FillOptions, FillReport};
pub use store::TranslationStore;
pub use translator::{GoogleTranslator, TranslateError, Translator};
