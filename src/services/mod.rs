pub mod prober;
pub mod resolver;
pub mod updates;

#[cfg(test)]
pub(crate) mod mock;
