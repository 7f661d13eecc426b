// Match pipeline: document → profile extraction → lab fetch → scoring → ranked matches.

pub mod extraction;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod ranking;
pub mod scoring;

pub use pipeline::MatchPipeline;
