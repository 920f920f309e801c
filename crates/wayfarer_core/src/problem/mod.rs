pub mod assignment_problem;
pub mod location;
pub mod meters;
pub mod mode;
pub mod problem_extractor;
pub mod purpose;
pub mod trip;
