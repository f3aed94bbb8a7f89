mod traits;
mod reply;
mod relay;

pub use traits::AnswerSource;
pub use reply::ServerReply;
pub use relay::{compose_api_error, RelayClient};
