pub mod client;
pub mod types;


pub use client::{NlpClient, NlpClientConfig, DEFAULT_NLP_URL};
pub use types::{
    HealthStatus, LemmatizerInfo, RemoteParseResult, RemoteParserInfo, RemoteToken, VoiceInfo,
};
