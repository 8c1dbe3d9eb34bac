//! Credential handling and fetch-target validation.

mod credentials;
pub mod url_policy;

pub use credentials::SecretString;
pub use url_policy::{host_matches, url_matches_any, UrlPolicy, NON_ARTICLE_HOSTS, STOREFRONT_HOSTS};
