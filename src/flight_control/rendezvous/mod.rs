mod docking;
mod rendezvous_runner;

pub use docking::{DockingController, DockingReport, run_docking};
pub use rendezvous_runner::{RendezvousReport, plane_change_needed, run_rendezvous};
