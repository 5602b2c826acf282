pub mod channels;
pub mod config;
pub mod countdown;
pub mod demo_feed;
pub mod error;
pub mod feed;
pub mod feed_fetch;
pub mod http_client;
pub mod live;
pub mod locator;
pub mod logging;
pub mod nav;
pub mod page;
pub mod presence;
pub mod provider;
pub mod ranking;
pub mod sitemap;
pub mod state;
