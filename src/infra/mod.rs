//! Infrastructure-backed implementations of the service traits.

pub mod s3_cache;

pub use s3_cache::S3InfographicsCache;
