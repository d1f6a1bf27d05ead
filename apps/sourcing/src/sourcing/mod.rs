// Developer sourcing pipeline.
// Stages: requirements extraction, search planning, cascading search with
// repository enrichment, weighted ranking. Inference goes through llm_client,
// profile search through the github module.

pub mod acquirer;
pub mod cascade;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod ranker;
pub mod relevance;
pub mod requirements;
pub mod strategy;
