#![forbid(unsafe_code)]

//! WASM frontend for the Folio portfolio page.
//!
//! All page behavior lives in `folio-core`; this crate captures the DOM once,
//! forwards browser events into [`folio_core::FolioController`], applies the
//! returned effects, and keeps a single timer armed for the controller's next
//! deadline.
//!
//! From JavaScript:
//!
//! ```js
//! import init, { FolioPage } from "./pkg/folio_web.js";
//! await init();
//! const page = new FolioPage();
//! page.mount({ scroll: { header_offset: 72 } });
//! ```

pub mod console_layer;
pub mod lifecycle;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::FolioPage;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct FolioPage;

#[cfg(not(target_arch = "wasm32"))]
impl FolioPage {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}
