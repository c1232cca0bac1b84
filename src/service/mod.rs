//! Crawl, render, and pipeline services.

pub mod crawler;
pub mod frontier;
pub mod http;
pub mod pacer;
pub mod pipeline;
pub mod renderer;
pub mod robots;
pub mod spa;
pub mod templates;

pub use crawler::SiteCrawler;
pub use frontier::Frontier;
pub use pacer::AdaptivePacer;
pub use pipeline::SeoPipeline;
pub use renderer::{JsRenderer, RenderedPage};
pub use robots::RobotsPolicy;
