/// State management module
///
/// This module holds the screen's in-memory state:
/// - Operation lifecycle for the three remote actions (operation.rs)
/// - Per-screen session fields and title validation (session.rs)

pub mod operation;
pub mod session;
