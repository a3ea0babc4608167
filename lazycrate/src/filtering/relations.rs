//! Relation metadata for relation-existence filters.
//!
//! `inMany`/`notInMany` filters name a [`RelationLink`], `inMorphMany`/
//! `notInMorphMany` filters name a [`MorphLink`]. Resources expose both lists
//! through [`LazyResource`](crate::LazyResource); the compiled plan refers to
//! them by name only.

/// Pivot table of a many-to-many relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotLink {
    /// Pivot table name (e.g., "person_tag")
    pub table: &'static str,
    /// Pivot column referencing the parent row (e.g., "person_id")
    pub parent_key: &'static str,
    /// Pivot column referencing the related row (e.g., "tag_id")
    pub related_key: &'static str,
}

/// A has-many or many-to-many relation of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationLink {
    /// Relation name as used for the filter field (e.g., "tags")
    pub name: &'static str,
    /// Related table
    pub table: &'static str,
    /// Without a pivot: column of the related table referencing the parent.
    /// With a pivot: key column of the related table.
    pub foreign_key: &'static str,
    /// Parent column the relation is keyed on, usually "id"
    pub local_key: &'static str,
    pub pivot: Option<PivotLink>,
}

impl RelationLink {
    /// Related rows whose `foreign_key` references the parent's `local_key`.
    #[must_use]
    pub const fn has_many(
        name: &'static str,
        table: &'static str,
        foreign_key: &'static str,
        local_key: &'static str,
    ) -> Self {
        Self {
            name,
            table,
            foreign_key,
            local_key,
            pivot: None,
        }
    }

    /// Related rows reached through a pivot table.
    #[must_use]
    pub const fn many_to_many(
        name: &'static str,
        table: &'static str,
        key: &'static str,
        local_key: &'static str,
        pivot: PivotLink,
    ) -> Self {
        Self {
            name,
            table,
            foreign_key: key,
            local_key,
            pivot: Some(pivot),
        }
    }
}

/// One concrete table a polymorphic relation can point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphTarget {
    /// Value stored in the type column (e.g., "post")
    pub morph_type: &'static str,
    pub table: &'static str,
    /// Key column of the target table, usually "id"
    pub key: &'static str,
}

/// A polymorphic belongs-to relation stored as a `(type, id)` column pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphLink {
    pub name: &'static str,
    pub type_column: &'static str,
    pub id_column: &'static str,
    pub targets: Vec<MorphTarget>,
}

impl MorphLink {
    #[must_use]
    pub fn target(&self, morph_type: &str) -> Option<&MorphTarget> {
        self.targets.iter().find(|t| t.morph_type == morph_type)
    }
}

/// Find a relation by filter field name.
#[must_use]
pub fn find_relation<'a>(relations: &'a [RelationLink], name: &str) -> Option<&'a RelationLink> {
    relations.iter().find(|r| r.name == name)
}

#[must_use]
pub fn find_morph<'a>(morphs: &'a [MorphLink], name: &str) -> Option<&'a MorphLink> {
    morphs.iter().find(|m| m.name == name)
}
