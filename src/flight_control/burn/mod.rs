mod burn_executor;
mod node_runner;

pub use burn_executor::BurnExecutor;
pub use burn_executor::BurnPhase;
pub use node_runner::BurnReport;
pub use node_runner::NodeExecution;
pub use node_runner::execute_all_nodes;
pub use node_runner::execute_next_node;
