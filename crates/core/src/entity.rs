//! Records that keep their identity across edits.

/// A record addressed by a stable id. A repriced car or a re-answered
/// question is still the same record.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// First row carrying `id`.
pub fn find_by_id<'a, E: Entity>(rows: &'a [E], id: &E::Id) -> Option<&'a E> {
    rows.iter().find(|row| row.id() == id)
}

/// Mutable counterpart of [`find_by_id`].
pub fn find_by_id_mut<'a, E: Entity>(rows: &'a mut [E], id: &E::Id) -> Option<&'a mut E> {
    rows.iter_mut().find(|row| row.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Row {
        id: u32,
        label: &'static str,
    }

    impl Entity for Row {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    #[test]
    fn lookup_by_id() {
        let mut rows = vec![Row { id: 1, label: "a" }, Row { id: 2, label: "b" }];
        assert_eq!(find_by_id(&rows, &2).map(|r| r.label), Some("b"));
        assert!(find_by_id(&rows, &3).is_none());

        if let Some(row) = find_by_id_mut(&mut rows, &1) {
            row.label = "z";
        }
        assert_eq!(rows[0].label, "z");
    }
}
