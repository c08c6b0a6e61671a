//! Shader Fetcher: looks shaders up on Shadertoy and downloads channel media.
//!
//! - `remote` owns the HTTP flow: the keyed API lookup, the single form-encoded
//!   fallback, and media downloads, all behind the `Transport` trait.
//! - `descriptor` holds the normalized `ShaderDescriptor` the renderer consumes
//!   and the serde mirrors of the site's JSON.
//! - `handle` turns ids, `shadertoy://` handles, and site URLs into bare ids.

mod descriptor;
mod error;
mod handle;
mod remote;

pub use descriptor::{ChannelInput, ChannelKind, RenderPass, ShaderDescriptor, MAX_CHANNELS};
pub use error::FetchError;
pub use handle::normalize_shader_reference;
pub use remote::{
    parse_fallback, parse_primary, HttpResponse, HttpTransport, LookupOutcome, ShadertoyClient,
    ShadertoyConfig, Transport, DEFAULT_API_KEY,
};
