use std::cmp::Ordering;

use crate::error::Error;

/// Compares a table entry against a lookup key.
pub type Comparator<T> = fn(&T, &str) -> Ordering;

/// Growable, insertion-ordered store.
///
/// Used three ways: as a per-class object pool (access by index), as the
/// append-only code stream, and as a name-keyed symbol table (search through
/// the installed comparator). Entries are never removed, so an index handed
/// out by [`Table::add`] stays valid for the life of the table.
#[derive(Debug, Clone)]
pub struct Table<T> {
    entries: Vec<T>,
    increment: usize,
    cmp: Option<Comparator<T>>,
}

impl<T> Table<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Table {
            entries: Vec::with_capacity(capacity),
            increment: capacity,
            cmp: None,
        }
    }

    pub fn with_comparator(capacity: usize, cmp: Comparator<T>) -> Self {
        Table {
            cmp: Some(cmp),
            ..Table::new(capacity)
        }
    }

    /// Appends `entry` and returns its index.
    pub fn add(&mut self, entry: T) -> Result<usize, Error> {
        if self.entries.len() == self.entries.capacity() {
            self.entries
                .try_reserve_exact(self.increment)
                .map_err(|_| Error::Allocation(self.entries.len() + self.increment))?;
        }
        self.entries.push(entry);
        Ok(self.entries.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    /// First entry equal to `key` under the installed comparator.
    pub fn find(&self, key: &str) -> Option<usize> {
        let cmp = self.cmp?;
        self.find_by(key, cmp)
    }

    /// First entry equal to `key` under `cmp`.
    pub fn find_by<K: ?Sized>(&self, key: &K, cmp: impl Fn(&T, &K) -> Ordering) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| cmp(entry, key) == Ordering::Equal)
    }
}

impl<'a, T> IntoIterator for &'a Table<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_name(entry: &(String, u32), key: &str) -> Ordering {
        entry.0.as_str().cmp(key)
    }

    #[test]
    fn grows_by_increment() {
        let mut t = Table::new(2);
        assert_eq!(t.add(10).unwrap(), 0);
        assert_eq!(t.add(11).unwrap(), 1);
        assert_eq!(t.add(12).unwrap(), 2);
        assert_eq!(t.len(), 3);
        assert!(t.capacity() >= 4);
        assert_eq!(t.as_slice(), &[10, 11, 12]);
    }

    #[test]
    fn zero_capacity_still_works() {
        let mut t = Table::new(0);
        t.add('a').unwrap();
        t.add('b').unwrap();
        assert_eq!(t.iter().collect::<String>(), "ab");
    }

    #[test]
    fn find_first_match() {
        let mut t = Table::with_comparator(4, by_name);
        t.add(("a".to_string(), 1)).unwrap();
        t.add(("b".to_string(), 2)).unwrap();
        t.add(("b".to_string(), 3)).unwrap();
        assert_eq!(t.find("b"), Some(1));
        assert_eq!(t.find("c"), None);
    }

    #[test]
    fn find_without_comparator() {
        let mut t: Table<u32> = Table::new(4);
        t.add(7).unwrap();
        assert_eq!(t.find("7"), None);
        assert_eq!(t.find_by(&7u32, |e, k| e.cmp(k)), Some(0));
    }
}
