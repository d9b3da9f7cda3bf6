//! HART: experience & restaurant recommender chat.

pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod services;
