pub mod daily_locks;
pub mod learning_log;
pub mod reservoirs;
pub mod review_sessions;
pub mod settings;
pub mod vocabulary;
