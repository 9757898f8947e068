mod completion;
mod joke;
mod store;

pub use completion::{
    ApiErrorBody, ApiErrorDetail, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    ChatRole, CompletionChoice, CompletionMessage,
};
pub use joke::{JokeRecord, JokeResult, format_relative_time, format_timestamp};
pub use store::KeyValueStore;
