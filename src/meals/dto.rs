use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub diet: Option<String>,
}
