pub mod command;
pub mod session;

pub use command::CommandService;
pub use session::{PairingOutcome, SessionService};
