//! Device-mode ordering, negotiation and virtual-mode synthesis
//!
//! # Overview
//!
//! - [`compare`]: the total order used for every per-source mode list
//!   (depth descending, landscape-normalized size ascending, refresh
//!   descending, then orientation, interlace and fixed-output ascending)
//! - [`negotiate`]: turns a partial, possibly ambiguous requested mode into
//!   a definite mode the source can display, or reports [`crate::error::WinDisplayError::BadMode`]
//! - [`virtual_modes`]: synthesizes a standard resolution menu when the
//!   host backend exposes only a single native mode

pub mod compare;
pub mod negotiate;
pub mod virtual_modes;

pub use compare::mode_compare;
pub use negotiate::{NegotiateOptions, SourceMode, resolve_mode};
pub use virtual_modes::synthesize_virtual_modes;
