//! Hierarchical result assembly.
//!
//! A one-to-many outer join comes back as flat rows in which the parent columns repeat
//! once per child and a childless parent appears once with NULL child columns. The
//! [`Grouper`] folds such a stream back into parent records that own their children.
//!
//! The store is responsible for ordering: rows must arrive sorted by parent id (then
//! child id). Grouping only ever looks at the previous row, so it never re-sorts and a
//! parent split across non-adjacent runs would be emitted twice.

mod rows;

/// A child row that the join marked present but that is missing a required column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{table} row {id} has NULL {column}")]
pub struct IncompleteRow {
    pub table: &'static str,
    pub id: i32,
    pub column: &'static str,
}

/// A parent record that owns a collection of child records.
pub trait Nest {
    type Child;

    fn nest(&mut self, child: Self::Child);
}

/// One flat row of a parent/child join.
pub trait FlatRow {
    /// Identity of the parent this row belongs to.
    type Key: PartialEq;
    type Parent: Nest;

    fn parent_key(&self) -> Self::Key;

    /// Build the parent record from this row's parent columns, with no children yet.
    fn parent(&self) -> Self::Parent;

    /// The child carried by this row, or `None` when the join produced NULL child columns.
    fn into_child(self) -> Result<Option<<Self::Parent as Nest>::Child>, IncompleteRow>;
}

/// Single-pass accumulator over a parent-ordered row sequence.
pub struct Grouper<R: FlatRow> {
    current: Option<(R::Key, R::Parent)>,
    finished: Vec<R::Parent>,
}

impl<R: FlatRow> Grouper<R> {
    pub fn new() -> Self {
        Self {
            current: None,
            finished: Vec::new(),
        }
    }

    pub fn push(&mut self, row: R) -> Result<(), IncompleteRow> {
        let key = row.parent_key();
        let same_parent = matches!(&self.current, Some((current_key, _)) if *current_key == key);

        if !same_parent {
            let parent = row.parent();
            if let Some((_, done)) = self.current.replace((key, parent)) {
                self.finished.push(done);
            }
        }

        if let Some(child) = row.into_child()? {
            if let Some((_, parent)) = self.current.as_mut() {
                parent.nest(child);
            }
        }
        Ok(())
    }

    /// Close the open accumulator and return every parent in first-seen order.
    pub fn finish(mut self) -> Vec<R::Parent> {
        if let Some((_, done)) = self.current.take() {
            self.finished.push(done);
        }
        self.finished
    }
}

impl<R: FlatRow> Default for Grouper<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Group a parent-ordered row sequence into nested parent records.
pub fn group_rows<R, I>(rows: I) -> Result<Vec<R::Parent>, IncompleteRow>
where
    R: FlatRow,
    I: IntoIterator<Item = R>,
{
    let mut grouper = Grouper::new();
    for row in rows {
        grouper.push(row)?;
    }
    Ok(grouper.finish())
}
