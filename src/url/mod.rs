//! URL handling for the catalog data routes
//!
//! - [`build_url`] renders the request URL for one page of a category
//! - [`with_page_param`] rewrites the page index of a URL the server returned
//! - [`absolutize`] and [`resolve_bare_link`] turn catalog paths into absolute URLs

mod builder;
mod normalize;
mod query;

pub use builder::{build_url, Category, SORT_ORDER, SOUNDS_SEGMENT};
pub use normalize::{absolutize, resolve_bare_link};
pub use query::{page_param, with_page_param, PAGE_PARAM};
