mod focus;
mod view;

#[cfg(test)]
mod tests;

pub use view::{Props, SyncConflictDialog};
