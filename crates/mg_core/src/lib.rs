pub mod error;
pub mod logging;
pub mod models;
pub mod parser;
pub mod quota;
pub mod search;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use logging::{init_logging, Logger};
pub use models::{ComposeParams, GeneratedImage, ImageRequest, InferenceModel, RewriteParams};
pub use quota::QuotaPlan;
pub use search::{ImageFetcher, SearchBackend, SearchQuery, SearchResult};
pub use storage::ObjectStorage;
pub use types::{
    CoverContent, MagazinePackage, ProcessData, RewrittenArticle, SourceArticle, Stage, Status,
    ARTICLE_DIVIDER,
};
