pub mod catalog;
pub mod channel;

pub use catalog::{
    CatalogItem, Category, ContentKind, Episode, LiveChannel, Season, SeriesDetails, SeriesItem,
    VodDetails, VodItem,
};
pub use channel::OpenChannel;
