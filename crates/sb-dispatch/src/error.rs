use sb_behavior::BehaviorError;
use sb_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("behavior `{0}` is already registered")]
    DuplicateBehavior(String),

    #[error("drain did not reach zero active tasks within {limit} iterations; force-removed {remaining:?}")]
    DrainExhausted {
        limit:     usize,
        remaining: Vec<String>,
    },

    #[error("dispatcher configuration error: {0}")]
    Config(String),

    #[error("config file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
