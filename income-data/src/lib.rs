mod loader;

pub use loader::{
    BracketLoader, BracketLoaderError, BracketRecord, DeductionItemRecord, IncomeItemRecord,
    ItemLoader, ItemLoaderError,
};
