// musicbot-files - client-side model of a music bot's file library
// Flat `/bot/files` listings rebuilt into a folder forest, plus the file API

pub mod bot;
pub mod config;
pub mod tree;

pub use bot::{BotError, HttpTransport, Method, RawRecord, RetryPolicy, Transport};
pub use config::BotConfig;
pub use tree::{FileNode, FolderNode, Forest, ForestBuilder, Node};
