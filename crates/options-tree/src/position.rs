/// Index of a node within a fixed-size ordered collection.
///
/// Positions are immutable; an array recreates them whenever its length
/// changes. An orphan node has a position of size 0, which is first but never
/// last.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, Hash)]
pub struct Position {
    index: usize,
    collection_size: usize,
}

impl Position {
    pub fn new(index: usize, collection_size: usize) -> Self {
        debug_assert!(index < collection_size || (index == 0 && collection_size == 0));
        Position {
            index,
            collection_size,
        }
    }

    pub fn orphan() -> Self {
        Position::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn collection_size(&self) -> usize {
        self.collection_size
    }

    /// Negative queries count from the end of the collection.
    pub fn is_at(&self, query_index: isize) -> bool {
        let index = self.index as isize;
        query_index == index || query_index == index - self.collection_size as isize
    }

    pub fn is_first(&self) -> bool {
        self.is_at(0)
    }

    pub fn is_last(&self) -> bool {
        self.is_at(-1)
    }
}
