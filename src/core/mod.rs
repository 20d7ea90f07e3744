pub mod debounce;
pub mod manager;
pub mod metadata;
pub mod scanner;
pub mod state;
pub mod watcher;
