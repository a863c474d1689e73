pub mod dump;
pub mod error;
pub mod exec;
pub mod loader;

#[cfg(test)]
mod test_utils;
