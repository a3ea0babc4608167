use lazycrate::filtering::{MorphLink, MorphTarget};
use lazycrate::{LazyLoadConfig, LazyResource};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub person_id: i32,
    pub body: String,
    pub commentable_type: String,
    pub commentable_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub person_id: i32,
    pub body: String,
}

impl From<Model> for Comment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            person_id: model.person_id,
            body: model.body,
        }
    }
}

impl LazyResource for Comment {
    type EntityType = Entity;

    const TABLE_NAME: &'static str = "comments";
    const RESOURCE_NAME_PLURAL: &'static str = "comments";

    fn lazy_load_config() -> LazyLoadConfig {
        LazyLoadConfig::default().with_morph_types(["post", "video"])
    }

    fn morph_relations() -> Vec<MorphLink> {
        vec![MorphLink {
            name: "commentable",
            type_column: "commentable_type",
            id_column: "commentable_id",
            targets: vec![
                MorphTarget {
                    morph_type: "post",
                    table: "posts",
                    key: "id",
                },
                MorphTarget {
                    morph_type: "video",
                    table: "videos",
                    key: "id",
                },
            ],
        }]
    }
}
