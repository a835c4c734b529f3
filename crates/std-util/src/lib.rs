//! Assertion macros shared by the workspace's tests.

pub mod option;
pub mod result;
pub mod slice;

pub mod prelude {
    pub use crate::{assert_empty, assert_err, assert_len, assert_none, assert_ok, assert_some};
}
