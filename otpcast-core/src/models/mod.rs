pub mod id;
pub mod identity;
pub mod message;
pub mod otp;
pub mod settings;

pub use id::SessionId;
pub use identity::IdentityAlias;
pub use message::{InboundMessage, PairingCode};
pub use otp::SmsRecord;
pub use settings::UserSettings;
