// Warren Mind Engine — Ollama Provider
//
// Calls a local Ollama daemon (or any OpenAI-compatible endpoint) for both
// ports: text generation and embeddings. Works out of the box against a
// default Ollama install; every call has an OpenAI-format fallback so the
// same client points at compatible servers unchanged.

use crate::atoms::error::EngineResult;
use crate::atoms::traits::{EmbeddingClient, GenerationClient};
use async_trait::async_trait;
use log::info;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Per-request HTTP deadline. The engine layers its own (shorter) timeout on
/// top; this one only bounds a hung socket.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OllamaClient {
    client: Client,
    base_url: String,
    generation_model: String,
    embedding_model: String,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        generation_model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        OllamaClient {
            client: Client::new(),
            base_url: base_url.into(),
            generation_model: generation_model.into(),
            embedding_model: embedding_model.into(),
        }
    }

    /// Default local daemon with small general-purpose models.
    pub fn local_default() -> Self {
        Self::new("http://localhost:11434", "llama3.2", "nomic-embed-text")
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Check if the daemon is reachable.
    pub async fn check_running(&self) -> bool {
        self.client
            .get(self.url("api/tags"))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|resp| resp.status().is_success())
            .unwrap_or(false)
    }

    // ── Generation ──────────────────────────────────────────────────────

    /// Ollama native: POST /api/generate { model, prompt, stream: false }
    /// → { response }
    async fn generate_ollama(&self, prompt: &str) -> EngineResult<String> {
        let body = json!({
            "model": self.generation_model,
            "prompt": prompt,
            "stream": false,
        });
        let resp = self
            .client
            .post(self.url("api/generate"))
            .json(&body)
            .timeout(HTTP_TIMEOUT)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("Ollama generate {} — {}", status, text).into());
        }
        let v: Value = resp.json().await?;
        v["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| "No 'response' field in Ollama generate reply".into())
    }

    /// OpenAI-compatible: POST /v1/chat/completions { model, messages }
    /// → choices[0].message.content
    async fn generate_openai(&self, prompt: &str) -> EngineResult<String> {
        let body = json!({
            "model": self.generation_model,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let resp = self
            .client
            .post(self.url("v1/chat/completions"))
            .json(&body)
            .timeout(HTTP_TIMEOUT)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("OpenAI-format generate {} — {}", status, text).into());
        }
        let v: Value = resp.json().await?;
        v["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| "No 'choices[0].message.content' in reply".into())
    }

    // ── Embeddings ──────────────────────────────────────────────────────

    /// Ollama current API: POST /api/embed { model, input }
    /// → { embeddings: [[f32…]] }; some versions answer a singular
    /// "embedding" even on this endpoint. Falls back to the legacy
    /// /api/embeddings { model, prompt } → { embedding: [f32…] }.
    async fn embed_ollama(&self, text: &str) -> EngineResult<Vec<f32>> {
        let body = json!({
            "model": self.embedding_model,
            "input": text,
        });
        let new_result = self
            .client
            .post(self.url("api/embed"))
            .json(&body)
            .timeout(HTTP_TIMEOUT)
            .send()
            .await;
        if let Ok(resp) = new_result {
            if resp.status().is_success() {
                if let Ok(v) = resp.json::<Value>().await {
                    if let Some(vector) = v["embeddings"]
                        .as_array()
                        .and_then(|e| e.first())
                        .and_then(|e| e.as_array())
                        .map(parse_f32_array)
                        .filter(|vec| !vec.is_empty())
                    {
                        return Ok(vector);
                    }
                    if let Some(vector) = v["embedding"]
                        .as_array()
                        .map(parse_f32_array)
                        .filter(|vec| !vec.is_empty())
                    {
                        return Ok(vector);
                    }
                }
            } else {
                info!(
                    "[mind:provider] /api/embed returned {} — trying legacy endpoint",
                    resp.status()
                );
            }
        }

        let legacy_body = json!({
            "model": self.embedding_model,
            "prompt": text,
        });
        let resp = self
            .client
            .post(self.url("api/embeddings"))
            .json(&legacy_body)
            .timeout(HTTP_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                format!(
                    "Ollama not reachable at {} — is Ollama running? Error: {}",
                    self.base_url, e
                )
            })?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("Ollama embed {} — {}", status, text).into());
        }
        let v: Value = resp.json().await?;
        let vector = v["embedding"]
            .as_array()
            .map(parse_f32_array)
            .filter(|vec| !vec.is_empty())
            .ok_or_else(|| "No 'embedding' array in Ollama response".to_string())?;
        Ok(vector)
    }

    /// OpenAI-compatible: POST /v1/embeddings { model, input }
    /// → data[0].embedding
    async fn embed_openai(&self, text: &str) -> EngineResult<Vec<f32>> {
        let body = json!({
            "model": self.embedding_model,
            "input": text,
        });
        let resp = self
            .client
            .post(self.url("v1/embeddings"))
            .json(&body)
            .timeout(HTTP_TIMEOUT)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("OpenAI-format embed {} — {}", status, text).into());
        }
        let v: Value = resp.json().await?;
        let vector = v["data"][0]["embedding"]
            .as_array()
            .map(parse_f32_array)
            .filter(|vec| !vec.is_empty())
            .ok_or_else(|| "No 'data[0].embedding' array in reply".to_string())?;
        Ok(vector)
    }
}

fn parse_f32_array(values: &Vec<Value>) -> Vec<f32> {
    values
        .iter()
        .filter_map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}

#[async_trait]
impl GenerationClient for OllamaClient {
    async fn synthesize(&self, prompt: &str) -> EngineResult<String> {
        match self.generate_ollama(prompt).await {
            Ok(text) => Ok(text),
            Err(ollama_err) => match self.generate_openai(prompt).await {
                Ok(text) => Ok(text),
                Err(openai_err) => Err(format!(
                    "Generation failed. Ollama: {} | OpenAI: {}",
                    ollama_err, openai_err
                )
                .into()),
            },
        }
    }

    fn model_name(&self) -> &str {
        &self.generation_model
    }
}

#[async_trait]
impl EmbeddingClient for OllamaClient {
    async fn embed(&self, text: &str) -> EngineResult<Vec<f32>> {
        match self.embed_ollama(text).await {
            Ok(vector) => Ok(vector),
            Err(ollama_err) => match self.embed_openai(text).await {
                Ok(vector) => Ok(vector),
                Err(openai_err) => Err(format!(
                    "Embedding failed. Ollama: {} | OpenAI: {}",
                    ollama_err, openai_err
                )
                .into()),
            },
        }
    }

    fn model_name(&self) -> &str {
        &self.embedding_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joining_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "m", "e");
        assert_eq!(client.url("api/embed"), "http://localhost:11434/api/embed");
    }

    #[test]
    fn parse_f32_array_skips_non_numbers() {
        let values = vec![json!(1.5), json!("nope"), json!(2.0)];
        assert_eq!(parse_f32_array(&values), vec![1.5, 2.0]);
    }
}
