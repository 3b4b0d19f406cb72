pub mod daily_session;
pub mod generator;
pub mod llm_provider;
