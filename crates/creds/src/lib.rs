/**
 * Multi-recipient encrypted credential boxes.
 *  Packs a user's capability tokens into one
 *  sealed record per gateway key holder, and
 *  opens the matching record at request time.
 */
pub mod accessbox;
/**
 * Opaque capability token types.
 *  Bearer tokens authorize object operations,
 *  session tokens authorize container
 *  configuration. Issued and validated
 *  elsewhere; carried here as bytes.
 */
pub mod tokens;

pub mod prelude {
    pub use crate::accessbox::{
        AccessBox, AccessBoxError, GateBundle, PublicKey, SecretKey,
    };
    pub use crate::tokens::{BearerToken, SessionToken};
}
