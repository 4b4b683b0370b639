pub mod driver;
pub mod launcher;
pub mod runner;
pub mod session;
pub mod transport;

pub use driver::{ConversationDriver, DriverState};
pub use launcher::{ServerLauncher, ServerProcess};
pub use runner::{FixtureOutcome, FixtureRunner, RunReport};
pub use session::run_session;
pub use transport::LineConnection;
