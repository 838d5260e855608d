mod upload;
mod watcher;
