pub mod classifier;
pub mod collaborators;
pub mod dispatch;
pub mod scanner;
pub mod signatures;
pub mod sync;
