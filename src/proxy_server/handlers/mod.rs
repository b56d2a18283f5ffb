//! Proxy server HTTP handlers.

mod not_found;
mod scrape;

pub use not_found::not_found_handler;
pub use scrape::scrape_handler;
