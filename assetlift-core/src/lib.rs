//! AssetLift Core Library
//!
//! Identity and progress primitives for the AssetLift chunked bundle upload
//! pipeline. This crate provides:
//! - ACI content identifiers (`aci:1:sha256:<hex>`)
//! - The multibase/multihash external identifier and its codec
//! - `UploadSession`, the resumable-upload progress record
//! - `MemoryStrategy`, the buffer-pool sizing tiers
//! - Common error handling

pub mod aci;
pub mod codec;
pub mod content_id;
pub mod error;
pub mod session;
pub mod strategy;

pub use aci::{Aci, AciError};
pub use codec::ContentIdentityCodec;
pub use content_id::{CodecVersion, ContentId, ContentIdError};
pub use error::{AssetLiftError, Result};
pub use session::UploadSession;
pub use strategy::{MemoryStrategy, MemoryThresholds, MIN_BUFFERS};

