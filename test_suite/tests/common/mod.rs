use axum::Router;
use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::prelude::*;

pub mod comment_entity;
pub mod person_entity;

pub use comment_entity::Comment;
pub use person_entity::{ActivePerson, Person};

// Helper function to get database URL from environment or default to SQLite
fn get_test_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

// RUST_LOG=lazycrate=debug shows validation failures and compiled plans
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fresh database with the people/tags/comments schema and seed rows.
#[allow(dead_code)]
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect(&get_test_database_url()).await?;
    Migrator::up(&db, None).await?;
    seed(&db).await?;
    Ok(db)
}

#[allow(dead_code)]
pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let api = Router::new()
        .nest("/people", lazycrate::handler::lazy_load_router::<Person>())
        .nest("/comments", lazycrate::handler::lazy_load_router::<Comment>())
        .with_state(db);

    Router::new().nest("/api/v1", api)
}

/// Ids of a result, in result order.
#[allow(dead_code)]
pub fn person_ids(people: &[Person]) -> Vec<i32> {
    people.iter().map(|p| p.id).collect()
}

/// Ids sorted, for order-independent comparisons.
#[allow(dead_code)]
pub fn sorted_person_ids(people: &[Person]) -> Vec<i32> {
    let mut ids = person_ids(people);
    ids.sort_unstable();
    ids
}

struct Seed {
    first_name: &'static str,
    last_name: &'static str,
    age: i32,
    status: &'static str,
    born_on: (i32, u32, u32),
    created_at: (i32, u32, u32, u32, u32),
}

const PEOPLE: [Seed; 5] = [
    Seed {
        first_name: "Ann",
        last_name: "Smith",
        age: 30,
        status: "active",
        born_on: (1994, 5, 1),
        created_at: (2024, 1, 10, 9, 0),
    },
    Seed {
        first_name: "Bob",
        last_name: "Johanson",
        age: 45,
        status: "active",
        born_on: (1979, 2, 11),
        created_at: (2024, 2, 15, 12, 0),
    },
    Seed {
        first_name: "Carla",
        last_name: "Mann",
        age: 22,
        status: "inactive",
        born_on: (2002, 5, 1),
        created_at: (2024, 3, 20, 8, 30),
    },
    Seed {
        first_name: "Dave",
        last_name: "Brown",
        age: 37,
        status: "pending",
        born_on: (1987, 11, 30),
        created_at: (2024, 4, 1, 0, 0),
    },
    Seed {
        first_name: "Eve",
        last_name: "Annet",
        age: 51,
        status: "active",
        born_on: (1973, 7, 4),
        created_at: (2024, 5, 5, 17, 45),
    },
];

async fn seed(db: &DatabaseConnection) -> Result<(), DbErr> {
    for person in &PEOPLE {
        let (y, m, d) = person.born_on;
        let (cy, cm, cd, ch, cmin) = person.created_at;
        let born_on = NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| DbErr::Custom("invalid seed date".into()))?;
        let created_at = Utc
            .with_ymd_and_hms(cy, cm, cd, ch, cmin, 0)
            .single()
            .ok_or_else(|| DbErr::Custom("invalid seed timestamp".into()))?;

        person_entity::ActiveModel {
            first_name: Set(person.first_name.to_string()),
            last_name: Set(person.last_name.to_string()),
            age: Set(person.age),
            status: Set(person.status.to_string()),
            born_on: Set(born_on),
            created_at: Set(created_at),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    for (id, name) in [(1, "rust"), (2, "sql"), (3, "go")] {
        db.execute_unprepared(&format!("INSERT INTO tags (id, name) VALUES ({id}, '{name}')"))
            .await?;
    }
    for (person_id, tag_id) in [(1, 1), (1, 2), (2, 2), (4, 3)] {
        db.execute_unprepared(&format!(
            "INSERT INTO person_tag (person_id, tag_id) VALUES ({person_id}, {tag_id})"
        ))
        .await?;
    }
    for (id, title) in [(10, "Hello"), (11, "Again")] {
        db.execute_unprepared(&format!("INSERT INTO posts (id, title) VALUES ({id}, '{title}')"))
            .await?;
    }
    for (id, title) in [(20, "Intro"), (21, "Outro")] {
        db.execute_unprepared(&format!("INSERT INTO videos (id, title) VALUES ({id}, '{title}')"))
            .await?;
    }

    let comments = [
        (1, 1, "first", "post", 10),
        (2, 2, "second", "video", 20),
        (3, 1, "third", "post", 11),
        (4, 3, "fourth", "video", 21),
    ];
    for (id, person_id, body, commentable_type, commentable_id) in comments {
        comment_entity::ActiveModel {
            id: Set(id),
            person_id: Set(person_id),
            body: Set(body.to_string()),
            commentable_type: Set(commentable_type.to_string()),
            commentable_id: Set(commentable_id),
        }
        .insert(db)
        .await?;
    }
    tracing::debug!(people = PEOPLE.len(), "Seeded test database");
    Ok(())
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(CreatePeopleTable),
            Box::new(CreateTagTables),
            Box::new(CreateCommentTables),
        ]
    }
}

fn id_column() -> ColumnDef {
    ColumnDef::new(Alias::new("id"))
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn titled_table(name: &str) -> TableCreateStatement {
    Table::create()
        .table(Alias::new(name))
        .if_not_exists()
        .col(id_column())
        .col(ColumnDef::new(Alias::new("title")).string().not_null())
        .to_owned()
}

pub struct CreatePeopleTable;

impl MigrationName for CreatePeopleTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_people_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreatePeopleTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Alias::new("people"))
            .if_not_exists()
            .col(id_column())
            .col(ColumnDef::new(Alias::new("first_name")).string().not_null())
            .col(ColumnDef::new(Alias::new("last_name")).string().not_null())
            .col(ColumnDef::new(Alias::new("age")).integer().not_null())
            .col(ColumnDef::new(Alias::new("status")).string().not_null())
            .col(ColumnDef::new(Alias::new("born_on")).date().not_null())
            .col(
                ColumnDef::new(Alias::new("created_at"))
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .to_owned();

        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("people")).to_owned())
            .await
    }
}

pub struct CreateTagTables;

impl MigrationName for CreateTagTables {
    fn name(&self) -> &'static str {
        "m20240101_000002_create_tag_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateTagTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("tags"))
                    .if_not_exists()
                    .col(id_column())
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("person_tag"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("person_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("tag_id")).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(Alias::new("person_id"))
                            .col(Alias::new("tag_id")),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in ["person_tag", "tags"] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).to_owned())
                .await?;
        }
        Ok(())
    }
}

pub struct CreateCommentTables;

impl MigrationName for CreateCommentTables {
    fn name(&self) -> &'static str {
        "m20240101_000003_create_comment_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateCommentTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(titled_table("posts")).await?;
        manager.create_table(titled_table("videos")).await?;
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("comments"))
                    .if_not_exists()
                    .col(id_column())
                    .col(ColumnDef::new(Alias::new("person_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("body")).string().not_null())
                    .col(ColumnDef::new(Alias::new("commentable_type")).string().not_null())
                    .col(ColumnDef::new(Alias::new("commentable_id")).integer().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in ["comments", "videos", "posts"] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).to_owned())
                .await?;
        }
        Ok(())
    }
}
