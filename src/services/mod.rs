pub mod benchmark_cache;
pub mod benchmark_fetcher;
pub mod benchmark_search;
pub mod competitor_scout;
pub mod completion;
pub mod insights_agent;
pub mod insights_store;
pub mod news_fetcher;
pub mod quota;
pub mod search_scraper;
pub mod ttl_cache;

pub use benchmark_cache::*;
pub use benchmark_fetcher::*;
pub use benchmark_search::*;
pub use competitor_scout::*;
pub use completion::*;
pub use insights_agent::*;
pub use insights_store::*;
pub use news_fetcher::*;
pub use quota::*;
pub use search_scraper::*;
pub use ttl_cache::*;
