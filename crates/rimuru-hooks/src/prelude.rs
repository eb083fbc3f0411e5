//! Everything a handler implementation needs.
//!
//! ```ignore
//! use rimuru_hooks::prelude::*;
//! ```

pub use async_trait::async_trait;
pub use rimuru_core::{AppError, AppResult};

pub use crate::handler::HookHandler;
pub use crate::hooks::definitions::{Hook, HookContext, HookData, HookResult};
pub use crate::hooks::registry::HandlerRegistration;
