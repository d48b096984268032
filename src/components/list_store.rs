use crate::view::RowHandle;

/// Entities and the rows showing them, index-aligned: row `i` shows entity
/// `i`. Append-only for as long as the owning pane lives.
#[derive(Debug, Clone)]
pub struct ListStore<T> {
    entities: Vec<T>,
    rows: Vec<RowHandle>,
}

impl<T> Default for ListStore<T> {
    fn default() -> Self {
        Self {
            entities: vec![],
            rows: vec![],
        }
    }
}

impl<T> ListStore<T> {
    /// Returns the new row's index.
    pub fn append(&mut self, entity: T, row: RowHandle) -> usize {
        self.entities.push(entity);
        self.rows.push(row);
        self.entities.len() - 1
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entities.get(index)
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<RowHandle> {
        self.rows.get(index).copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.entities.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, RowHandle)> {
        self.entities.iter().zip(self.rows.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::WidgetId;

    fn handle(id: u64) -> RowHandle {
        RowHandle {
            row: WidgetId(id),
            image: None,
        }
    }

    #[test]
    fn indices_follow_append_order() {
        let mut store = ListStore::default();

        assert_eq!(store.append("general", handle(10)), 0);
        assert_eq!(store.append("random", handle(11)), 1);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1), Some(&"random"));
        assert_eq!(store.row(1), Some(handle(11)));
        assert_eq!(store.last(), Some(&"random"));
    }

    #[test]
    fn out_of_range_lookups_find_nothing() {
        let mut store = ListStore::default();
        assert!(store.is_empty());
        assert_eq!(store.get(0), None::<&u32>);

        store.append(5, handle(0));
        assert_eq!(store.get(1), None);
        assert_eq!(store.row(1), None);
    }

    #[test]
    fn entities_and_rows_stay_aligned() {
        let mut store = ListStore::default();
        for i in 0..5 {
            store.append(i, handle(100 + i));
        }

        for (entity, row) in store.iter() {
            assert_eq!(row.row, WidgetId(100 + entity));
        }
    }
}
