//! LLM Gateway - a stateless translator that routes OpenAI-style chat
//! completions to Groq, OpenAI, OpenRouter or Gemini.

pub mod config;
pub mod gateway;
pub mod handlers;
pub mod llm;
pub mod response;
pub mod server;
