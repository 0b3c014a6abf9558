mod file;
#[cfg(test)]
mod memory;

pub use file::FileStore;
#[cfg(test)]
pub use memory::MemoryStore;
