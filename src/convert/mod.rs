//! Document conversion behind a platform-strategy trait.
//!
//! The rest of the system only sees [`Converter`]; the strategy (which
//! binary, which arguments) is resolved once at startup. Tests substitute
//! their own implementations through the same trait.

mod command;
mod soffice;

pub use command::{ToolCommand, ToolOutput};
pub use soffice::SofficeConverter;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// A document-to-PDF conversion strategy.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Strategy name, for logs and error messages.
    fn name(&self) -> &str;

    /// Convert `input` into a PDF at `output`.
    ///
    /// On success the artifact exists at `output`. The input file is left in
    /// place; cleanup is the caller's concern.
    async fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}
