use crate::codec::{read_bytes, write_bytes, write_raw, Readable, Writable};
use crate::error::{ReadError, WriteError};
use crate::identity::Identity;
use std::io::{Read, Write};

/// Type tag of a jointly owned (escrow) identity.
pub const MULTISIG_TYPE: &str = "ms";
/// Type tag of an identity whose payload is an HTLC script.
pub const HTLC_SCRIPT_TYPE: &str = "htlc";

const MAGIC: &[u8; 4] = b"tid1";

/// An identity payload tagged with the scheme that knows how to interpret it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedIdentity {
    pub identity_type: String,
    pub identity: Vec<u8>,
}

impl TypedIdentity {
    pub fn new(identity_type: impl Into<String>, identity: impl Into<Vec<u8>>) -> Self {
        Self { identity_type: identity_type.into(), identity: identity.into() }
    }

    pub fn is_type(&self, identity_type: &str) -> bool {
        self.identity_type == identity_type
    }

    pub fn to_identity(&self) -> Result<Identity, WriteError> {
        Ok(Identity::new(self.serialize()?))
    }

    /// Unwraps a raw identity. Untyped bytes are reported as a [`ReadError`].
    pub fn unwrap(identity: &Identity) -> Result<Self, ReadError> {
        Self::from_bytes(identity.as_bytes())
    }
}

impl Writable for TypedIdentity {
    fn write<W: Write>(&self, writer: &mut W) -> Result<(), WriteError> {
        write_raw(writer, MAGIC, "TypedIdentity")?;
        write_bytes(writer, self.identity_type.as_bytes(), "identity_type")?;
        write_bytes(writer, &self.identity, "identity")
    }
}

impl Readable for TypedIdentity {
    fn read<R: Read>(reader: &mut R) -> Result<Self, ReadError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(|e| ReadError::new("TypedIdentity", e.to_string()))?;
        if &magic != MAGIC {
            return Err(ReadError::new("TypedIdentity", "not a typed identity"));
        }
        let identity_type = String::from_utf8(read_bytes(reader, "identity_type")?)
            .map_err(|e| ReadError::new("identity_type", e.to_string()))?;
        let identity = read_bytes(reader, "identity")?;
        Ok(Self { identity_type, identity })
    }
}

/// Wraps `payload` in a typed identity carrying `identity_type`.
pub fn wrap_with_type(identity_type: &str, payload: impl Into<Vec<u8>>) -> Result<Identity, WriteError> {
    TypedIdentity::new(identity_type, payload).to_identity()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wrap_and_unwrap() {
        let id = wrap_with_type(HTLC_SCRIPT_TYPE, b"script".to_vec()).unwrap();
        let typed = TypedIdentity::unwrap(&id).unwrap();
        assert!(typed.is_type(HTLC_SCRIPT_TYPE));
        assert!(!typed.is_type(MULTISIG_TYPE));
        assert_eq!(typed.identity, b"script");
    }

    #[test]
    fn untyped_bytes_are_rejected() {
        let err = TypedIdentity::unwrap(&Identity::new(b"invalid".to_vec())).unwrap_err();
        assert_eq!(err.field(), "TypedIdentity");
        assert!(TypedIdentity::unwrap(&Identity::none()).is_err());

        let mut truncated = wrap_with_type(MULTISIG_TYPE, b"abc".to_vec()).unwrap().into_bytes();
        truncated.pop();
        assert!(TypedIdentity::unwrap(&Identity::new(truncated)).is_err());
    }
}
