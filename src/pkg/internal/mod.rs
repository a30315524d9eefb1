pub mod access;
pub mod adaptors;
pub mod applications;
pub mod auth;
pub mod directory;
pub mod jobs;
pub mod paging;
pub mod professionals;

#[cfg(test)]
pub mod testing;
