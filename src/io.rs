//! File I/O for oriented point clouds.

pub mod xyz;
