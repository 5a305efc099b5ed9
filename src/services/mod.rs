/// OpenAPI documentation generation.
pub mod documentation;
/// Guess normalisation and matching.
pub mod guess_evaluator;
/// Health check service.
pub mod health_service;
/// Public service for read-only room information.
pub mod public_service;
/// Timed round loop.
pub mod round_scheduler;
/// Construction and delivery of session events.
pub mod session_events;
/// Join, reconnect, leave and guess operations.
pub mod session_service;
/// Server-Sent Events streaming of room events.
pub mod sse_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
