pub mod gateway;
pub mod sse;
pub mod transcript;

pub use gateway::{AssistantGateway, GatewayError};
pub use sse::{AssemblerEvent, SseAssembler};
pub use transcript::{ChatPhase, Transcript, TranscriptError};
