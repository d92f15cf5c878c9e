use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("failed to set Ruby grammar on the parser")]
    LanguageSet,

    #[error("failed to parse source text")]
    ParseFailed,
}
