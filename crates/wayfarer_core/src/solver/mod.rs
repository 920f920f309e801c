pub mod assignment_solver;
pub mod discretization_solver;
pub mod gravity_chain_solver;
pub mod objective;
pub mod score;
pub mod solution;
pub mod solver_params;
