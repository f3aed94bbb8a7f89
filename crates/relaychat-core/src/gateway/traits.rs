use crate::error::GatewayError;

/// Anything that can turn a user query into an answer.
#[async_trait::async_trait]
pub trait AnswerSource: Send + Sync {
    async fn ask(&self, query: &str) -> Result<String, GatewayError>;
}

#[async_trait::async_trait]
impl<T: AnswerSource + ?Sized> AnswerSource for Box<T> {
    async fn ask(&self, query: &str) -> Result<String, GatewayError> {
        (**self).ask(query).await
    }
}

#[async_trait::async_trait]
impl<T: AnswerSource + ?Sized> AnswerSource for std::sync::Arc<T> {
    async fn ask(&self, query: &str) -> Result<String, GatewayError> {
        (**self).ask(query).await
    }
}
