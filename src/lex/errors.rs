use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexError {
    #[error("pair counter overflow on line {line}: more than {max} markers", max = u32::MAX)]
    Overflow { line: usize },
}
