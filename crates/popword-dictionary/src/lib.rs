pub mod free_dictionary;
pub mod types;

pub use free_dictionary::FreeDictionary;
pub use types::{DefinitionDetail, DictEntry, Dictionary, LookupError, Meaning, PartOfSpeech};
