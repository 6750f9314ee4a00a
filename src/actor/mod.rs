//! Actors: the clients under test that emit observations and obey commands.

pub mod simulated;
pub mod traits;

pub use simulated::SimulatedActor;
pub use traits::Actor;
