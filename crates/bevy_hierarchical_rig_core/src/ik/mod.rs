pub mod blend;
pub mod spline;
pub mod two_bone;

pub use spline::solve_spline;
pub use two_bone::solve_two_bone;
