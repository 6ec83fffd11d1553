//! Runtime services around the pure domain: match tasks, registry, lobby,
//! deadline sweep, settlement and the ledger/transport seams.

pub mod clock;
pub mod deadline;
pub mod ledger;
pub mod lobby;
pub mod match_actor;
pub mod match_registry;
pub mod settlement;
pub mod transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::{InMemoryLedger, Ledger};
pub use lobby::{JoinOutcome, LeaveOutcome, Lobby};
pub use match_registry::MatchRegistry;
pub use transport::{RecordingTransport, Transport};
