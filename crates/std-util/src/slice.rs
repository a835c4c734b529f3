/// Asserts that a collection has no elements.
#[macro_export]
macro_rules! assert_empty {
    ($e:expr) => {{
        let e = &$e;
        if !e.is_empty() {
            panic!("expected empty; actual len={} value={:?}", e.len(), e);
        }
    }};
}

/// Asserts a collection's length.
#[macro_export]
macro_rules! assert_len {
    ($e:expr, $len:expr) => {{
        let e = &$e;
        let len = $len;
        if e.len() != len {
            panic!("expected len={}; actual len={} value={:?}", len, e.len(), e);
        }
    }};
}
