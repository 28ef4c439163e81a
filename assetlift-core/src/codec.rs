//! Content identity codec
//!
//! String-level translation between ACIs and external identifiers. The
//! `encode`/`decode` pair returns `None` for any malformed input; the
//! `try_*` variants report which validation step failed.

use crate::aci::Aci;
use crate::content_id::ContentId;
use crate::error::Result;

/// Stateless ACI <-> external identifier codec
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentIdentityCodec;

impl ContentIdentityCodec {
    /// Encode an ACI string as an external identifier
    pub fn encode(aci: &str) -> Option<String> {
        Self::try_encode(aci).ok()
    }

    /// Decode an external identifier back to its ACI string
    pub fn decode(id: &str) -> Option<String> {
        Self::try_decode(id).ok()
    }

    /// Like [`encode`](Self::encode), with the rejection reason
    pub fn try_encode(aci: &str) -> Result<String> {
        let aci = Aci::parse(aci)?;
        Ok(ContentId::from_aci(&aci).encode())
    }

    /// Like [`decode`](Self::decode), with the rejection reason
    pub fn try_decode(id: &str) -> Result<String> {
        let id = ContentId::parse(id)?;
        Ok(id.to_aci().to_string())
    }
}
