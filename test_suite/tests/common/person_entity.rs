use chrono::{DateTime, NaiveDate, Utc};
use lazycrate::LazyResource;
use lazycrate::filtering::{PivotLink, RelationLink};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "people")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub status: String,
    pub born_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// API representation of a person
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub status: String,
    pub born_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for Person {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            age: model.age,
            status: model.status,
            born_on: model.born_on,
            created_at: model.created_at,
        }
    }
}

impl LazyResource for Person {
    type EntityType = Entity;

    const TABLE_NAME: &'static str = "people";
    const RESOURCE_NAME_PLURAL: &'static str = "people";

    fn global_filter_fields() -> Vec<&'static str> {
        vec!["first_name", "last_name"]
    }

    fn relations() -> Vec<RelationLink> {
        vec![
            RelationLink::has_many("comments", "comments", "person_id", "id"),
            RelationLink::many_to_many(
                "tags",
                "tags",
                "id",
                "id",
                PivotLink {
                    table: "person_tag",
                    parent_key: "person_id",
                    related_key: "tag_id",
                },
            ),
        ]
    }
}

/// People who are not archived; exercises the `base_query` scope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivePerson(pub Person);

impl From<Model> for ActivePerson {
    fn from(model: Model) -> Self {
        Self(Person::from(model))
    }
}

impl LazyResource for ActivePerson {
    type EntityType = Entity;

    const TABLE_NAME: &'static str = "people";
    const RESOURCE_NAME_PLURAL: &'static str = "active_people";

    fn base_query() -> Select<Entity> {
        Entity::find().filter(Column::Status.eq("active"))
    }
}
