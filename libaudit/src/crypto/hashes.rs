use blake2::{Blake2b512, Digest};
use curve25519_dalek::Scalar;

/// Hashes arbitrary bytes onto the scalar field.
pub trait HashToScalar: Default {
    type Scalar;
    fn hash_to_scalar<B: AsRef<[u8]>>(&mut self, input: B) -> Self::Scalar;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Blake512;

impl HashToScalar for Blake512 {
    type Scalar = Scalar;
    fn hash_to_scalar<B: AsRef<[u8]>>(&mut self, input: B) -> Self::Scalar {
        let hashed = Blake2b512::new().chain_update(input.as_ref()).finalize();
        let mut result = [0u8; 64];
        result.copy_from_slice(hashed.as_slice());
        Scalar::from_bytes_mod_order_wide(&result)
    }
}

/// Hash a token type string to a scalar. This is `H(type)` in the token data commitment.
pub fn hash_token_type(token_type: &str) -> Scalar {
    Blake512.hash_to_scalar(token_type.as_bytes())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hash_to_scalar_is_deterministic() {
        let a = hash_token_type("USD");
        let b = hash_token_type("USD");
        let c = hash_token_type("EUR");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(hash_token_type(""), Scalar::ZERO);
    }
}
