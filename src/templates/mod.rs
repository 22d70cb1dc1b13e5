//! Template-rendering subsystem.
//!
//! # Data Flow
//! ```text
//! Request under a templateDir route
//!     → handler.rs (resolve alias / literal / implied .html / index.html)
//!     → tera render → HTML, 404 for unknown names, 500 on render failure
//! ```

pub mod handler;

pub use handler::TemplateService;
