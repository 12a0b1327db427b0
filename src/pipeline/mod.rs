pub mod extraction;
pub mod prediction;
pub mod storage;
pub mod processor; // Report orchestrator: acquire → predict → store → save
