pub mod claims;
pub mod codec;
pub mod errors;

pub use claims::Expiring;
pub use claims::Identity;
pub use claims::RefreshClaims;
pub use claims::SignedClaims;
pub use codec::TokenCodec;
pub use errors::JwtError;
