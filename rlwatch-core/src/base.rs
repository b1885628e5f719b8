//! Core functionalities.
mod agent;
mod callback;
mod env;
mod policy;
mod step;
pub use agent::Agent;
pub use callback::Callback;
pub use env::Env;
pub use policy::Policy;
pub use step::Step;
