// wire contract of the NLP microservice
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteParserInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub languages: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct ParsersResponse {
    pub parsers: Vec<RemoteParserInfo>,
}

#[derive(Serialize)]
pub(crate) struct ParseRequest<'a> {
    pub text: &'a str,
    pub parser: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteToken {
    pub text: String,
    pub is_word: bool,
    #[serde(default)]
    pub reading: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteParseResult {
    pub sentences: Vec<String>,
    pub tokens: Vec<RemoteToken>,
}

#[derive(Serialize)]
pub(crate) struct LemmatizeRequest<'a> {
    pub word: &'a str,
    pub language: &'a str,
    pub lemmatizer: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct LemmaResponse {
    #[allow(dead_code)]
    pub word: String,
    pub lemma: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct BatchLemmatizeRequest<'a> {
    pub words: &'a [String],
    pub language: &'a str,
    pub lemmatizer: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct BatchLemmaResponse {
    pub results: HashMap<String, Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmatizerInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub languages: Vec<String>,
    pub available: bool,
}

#[derive(Deserialize)]
pub(crate) struct LemmatizersResponse {
    pub lemmatizers: Vec<LemmatizerInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub installed: bool,
}

#[derive(Deserialize)]
pub(crate) struct VoicesResponse {
    pub voices: Vec<VoiceInfo>,
}

#[derive(Serialize)]
pub(crate) struct SpeakRequest<'a> {
    pub text: &'a str,
    pub voice_id: &'a str,
}

#[derive(Serialize)]
pub(crate) struct DownloadRequest<'a> {
    pub voice_id: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct SuccessResponse {
    #[serde(default)]
    pub success: bool,
}
