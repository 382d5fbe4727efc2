pub mod article_source;
pub mod price_lookup;

pub use article_source::{ArticleSource, MfnSource};
pub use price_lookup::{FixedPriceLookup, InvestingLookup, PriceLookup};
