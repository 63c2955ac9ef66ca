//! CPU-side texture types.
//!
//! Provides [`CpuTexture`] for holding decoded pixel data, along with the
//! [`ChannelEncoding`] and [`ImageOrigin`] descriptors a renderer needs to
//! interpret it.

mod types;

pub use types::{ChannelEncoding, CpuTexture, ImageOrigin};
