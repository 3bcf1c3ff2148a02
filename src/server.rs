//! Local preview server for the generated site.
//!
//! - Request path resolution (`resolve`)
//! - Extension to content type mapping (`mime`)
//! - The request handler (`handler`)
//! - Start/stop control (`lifecycle`)

mod handler;
mod lifecycle;
mod mime;
mod resolve;

pub use handler::{ServeState, SharedState, serve_file};
pub use lifecycle::{ServerConfig, ServerError, SiteServer, router};
pub use mime::content_type;
pub use resolve::{ResolveError, resolve};
