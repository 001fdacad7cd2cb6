// Chunked NDJSON streaming utilities
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Create a chunked response with one JSON document per line
pub fn ndjson_stream<S, T>(stream: S) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let byte_stream = stream.map(|msg| serialize_line(&msg));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single message followed by a newline
pub fn serialize_line<T: Serialize>(msg: &T) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_vec(msg)?;
    let mut chunk = BytesMut::with_capacity(json.len() + 1);
    chunk.put_slice(&json);
    chunk.put_u8(b'\n');
    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a receiver, mapping each message
pub fn stream_from_receiver<T, U, F>(mut rx: tokio::sync::mpsc::Receiver<T>, map: F) -> impl IntoResponse
where
    T: Send + 'static,
    U: Serialize + Send + 'static,
    F: Fn(T) -> U + Send + 'static,
{
    let stream = async_stream::stream! {
        while let Some(msg) = rx.recv().await {
            yield map(msg);
        }
    };

    match ndjson_stream(stream) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
