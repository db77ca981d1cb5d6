//! OpenAI-compatible SSE stream parser
//!
//! - events carry JSON with `choices[0].delta.content`
//! - `choices[0].finish_reason` is reported on the last content event
//! - `[DONE]` terminates the stream

use crate::error::{ChatError, ChatResult};
use crate::llm::sse_decoder::{SseDecoder, SseEvent};
use crate::llm::streaming::{CompletionStream, StreamChunk};
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use std::pin::Pin;

type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, String>> + Send>>;

struct SseState {
    bytes: ByteStream,
    decoder: SseDecoder,
    pending: VecDeque<ChatResult<StreamChunk>>,
    finish_reason: Option<String>,
    finished: bool,
}

impl SseState {
    fn push_event(&mut self, event: SseEvent) {
        if self.finished {
            return;
        }
        if event.is_done() {
            self.pending
                .push_back(Ok(StreamChunk::final_chunk(self.finish_reason.take())));
            self.finished = true;
            return;
        }

        let json: Value = match serde_json::from_str(&event.data) {
            Ok(json) => json,
            Err(e) => {
                self.fail(format!("Invalid stream payload: {}", e));
                return;
            }
        };

        if let Some(error) = json.get("error") {
            let message = error["message"].as_str().unwrap_or("unknown error");
            self.fail(format!("OpenAI stream error: {}", message));
            return;
        }

        let Some(choice) = json["choices"].as_array().and_then(|c| c.first()) else {
            return;
        };
        if let Some(reason) = choice["finish_reason"].as_str() {
            self.finish_reason = Some(reason.to_string());
        }
        if let Some(content) = choice["delta"]["content"].as_str() {
            if !content.is_empty() {
                self.pending.push_back(Ok(StreamChunk::content(content)));
            }
        }
    }

    fn fail(&mut self, message: String) {
        self.pending.push_back(Err(ChatError::llm(message)));
        self.finished = true;
    }
}

/// Parse an OpenAI-compatible SSE byte stream into a [`CompletionStream`]
pub(super) fn openai_sse_stream<S, B, E>(byte_stream: S) -> CompletionStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let bytes: ByteStream = Box::pin(
        byte_stream.map(|chunk| chunk.map(|b| b.as_ref().to_vec()).map_err(|e| e.to_string())),
    );
    let state = SseState {
        bytes,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finish_reason: None,
        finished: false,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    for event in state.decoder.feed(&chunk) {
                        state.push_event(event);
                    }
                }
                Some(Err(e)) => state.fail(format!("Stream error: {}", e)),
                None => {
                    if let Some(event) = state.decoder.finish() {
                        state.push_event(event);
                    }
                    if !state.finished {
                        state.fail("Stream ended before [DONE]".to_string());
                    }
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_stream(chunks: Vec<&'static str>) -> impl Stream<Item = Result<Vec<u8>, String>> {
        futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(c.as_bytes().to_vec()))
                .collect::<Vec<_>>(),
        )
    }

    async fn collect(stream: CompletionStream) -> Vec<ChatResult<StreamChunk>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_parses_deltas_and_done() {
        let stream = openai_sse_stream(byte_stream(vec![
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"choi",
            "ces\":[{\"delta\":{\"content\":\"lo\"},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        ]));

        let chunks: Vec<StreamChunk> = collect(stream)
            .await
            .into_iter()
            .map(|c| c.unwrap())
            .collect();

        assert_eq!(
            chunks,
            vec![
                StreamChunk::content("Hel"),
                StreamChunk::content("lo"),
                StreamChunk::final_chunk(Some("stop".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_ignores_data_after_done() {
        let stream = openai_sse_stream(byte_stream(vec![
            "data: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n",
        ]));

        let chunks = collect(stream).await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].as_ref().unwrap().is_final);
    }

    #[tokio::test]
    async fn test_error_payload_ends_stream() {
        let stream = openai_sse_stream(byte_stream(vec![
            "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n",
            "data: {\"error\":{\"message\":\"overloaded\"}}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n\n",
        ]));

        let chunks = collect(stream).await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].is_ok());
        assert!(matches!(&chunks[1], Err(ChatError::Llm { message, .. }) if message.contains("overloaded")));
    }

    #[tokio::test]
    async fn test_missing_done_is_an_error() {
        let stream = openai_sse_stream(byte_stream(vec![
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
        ]));

        let chunks = collect(stream).await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap(), &StreamChunk::content("Hel"));
        assert!(matches!(&chunks[1], Err(ChatError::Llm { message, .. }) if message.contains("[DONE]")));
    }

    #[tokio::test]
    async fn test_done_without_trailing_newline_is_accepted() {
        let stream = openai_sse_stream(byte_stream(vec![
            "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\ndata: [DONE]",
        ]));

        let chunks = collect(stream).await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].as_ref().unwrap().is_final);
    }

    #[tokio::test]
    async fn test_transport_error_surfaces() {
        let stream = openai_sse_stream(futures::stream::iter(vec![
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n".as_bytes().to_vec()),
            Err("connection reset".to_string()),
        ]));

        let chunks = collect(stream).await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].is_err());
    }
}
