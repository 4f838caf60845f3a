//! Offset pagination primitives shared by the user and group repositories.
//!
//! Callers speak in 1-based pages ([`PageRequest`]); repositories speak in
//! zero-based offsets ([`OffsetWindow`]). The conversion lives here so both
//! sides agree on `offset = (page - 1) * per_page`. Totals are reported back to
//! callers through [`PageMeta`] inside a [`Page`] envelope.
//!
//! Clamping user input into a sane range is the job of the layer that owns the
//! request ([`PageRequest::clamped`]). Repositories never clamp: an
//! [`OffsetWindow`] is passed through to the store verbatim.

mod envelope;
mod request;
mod window;

pub use envelope::{Page, PageMeta};
pub use request::{DEFAULT_PER_PAGE, MAX_PER_PAGE, PageRequest, PageRequestError};
pub use window::OffsetWindow;
