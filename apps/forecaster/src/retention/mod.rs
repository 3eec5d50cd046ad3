// Rolling-window persistence for EventRecords.
// Every insert is preceded by a sweep of records older than the window.

pub mod manager;
pub mod store;

#[cfg(test)]
pub mod memory;
