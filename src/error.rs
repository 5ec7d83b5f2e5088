use std::fmt::Debug;

/// RbError enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RbError<T>
where
    T: Debug,
{
    /// Fatal case, root node is colored red.
    #[error("root node is red")]
    RedRoot,
    /// Fatal case, a red node has a red child.
    #[error("consecutive red nodes")]
    ConsecutiveReds,
    /// Fatal case, black-height differs between left and right child.
    /// The String component of this variant can be used for debugging.
    #[error("unbalanced blacks: {0}")]
    UnbalancedBlacks(String),
    /// Fatal case, values are not in sort-order. First component is the
    /// offending value, second is the ancestor it was compared with.
    #[error("sort error: {0:?} against {1:?}")]
    SortError(T, T),
    /// Fatal case, parent link does not point back to the parent.
    #[error("broken link: {0}")]
    BrokenLink(String),
}
