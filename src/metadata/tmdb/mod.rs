mod config;
mod error;
mod models;
mod provider;

pub use config::TmdbConfig;
pub use error::{TmdbError, TmdbResult};
pub use provider::TmdbProvider;

use crate::metadata::ProviderError;

impl From<TmdbError> for ProviderError {
    fn from(err: TmdbError) -> Self {
        ProviderError::unavailable(err.to_string(), err)
    }
}
