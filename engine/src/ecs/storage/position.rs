/// A slot in a dense store. A simple index into the store's compact value vec.
///
/// Positions act as the address of a stored value: they change only when the store moves a
/// value, never when the backing vec grows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(usize);

impl From<usize> for Position {
    /// Get a position from a usize index.
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

impl Position {
    /// Construct a new position from an index.
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the index used in the store vecs.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}
