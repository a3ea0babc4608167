/*!
# Lazy load benchmarks

Measures descriptor validation, plan compilation and full lazy loads against
an in-memory SQLite database.

## Usage

```bash
cargo bench --bench lazy_benchmarks

# Quick run with fewer samples
cargo bench --bench lazy_benchmarks -- --quick
```

HTML reports are generated in `target/criterion/report/index.html`.
*/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lazycrate::{LazyLoadConfig, LazyResource, compile, lazy_load, validate};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, entity::prelude::*};
use serde::Serialize;
use serde_json::{Value, json};
use std::hint::black_box;
use std::time::Duration;

mod task {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "tasks")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub title: String,
        pub priority: i32,
        pub status: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Clone, Debug, Serialize)]
struct Task {
    id: i32,
    title: String,
    priority: i32,
    status: String,
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            priority: model.priority,
            status: model.status,
        }
    }
}

impl LazyResource for Task {
    type EntityType = task::Entity;

    const TABLE_NAME: &'static str = "tasks";
    const RESOURCE_NAME_PLURAL: &'static str = "tasks";

    fn global_filter_fields() -> Vec<&'static str> {
        vec!["title", "status"]
    }
}

async fn setup_database(rows: usize) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    db.execute_unprepared(
        "CREATE TABLE tasks (id INTEGER PRIMARY KEY, title TEXT NOT NULL, priority INTEGER NOT NULL, status TEXT NOT NULL)",
    )
    .await?;

    let statuses = ["open", "closed", "blocked"];
    for i in 0..rows {
        let status = statuses[i % statuses.len()];
        let priority = i % 5;
        db.execute_unprepared(&format!(
            "INSERT INTO tasks (title, priority, status) VALUES ('Task {i}', {priority}, '{status}')"
        ))
        .await?;
    }
    Ok(db)
}

fn simple_descriptor() -> Value {
    json!({
        "filters": {"status": {"value": "open", "matchMode": "equals"}},
        "sortField": "priority",
        "sortOrder": -1,
        "paginate": true,
        "rows": 20,
        "page": 1
    })
}

fn complex_descriptor() -> Value {
    json!({
        "filters": {
            "global": {"value": "task 1", "matchMode": "contains"},
            "priority": {
                "operator": "or",
                "constraints": [
                    {"value": [1, 2], "matchMode": "between"},
                    {"value": 4, "matchMode": "equals"}
                ]
            },
            "status": {"value": ["open", "blocked"], "matchMode": "in"}
        },
        "multiSortMeta": [
            {"field": "status", "order": 1},
            {"field": "priority", "order": -1},
            {"field": "id", "order": 1}
        ],
        "paginate": true,
        "rows": 50,
        "page": 2
    })
}

fn bench_validation(c: &mut Criterion) {
    let config = LazyLoadConfig::default();
    let mut group = c.benchmark_group("Validation");

    for (name, descriptor) in [("simple", simple_descriptor()), ("complex", complex_descriptor())] {
        group.bench_with_input(BenchmarkId::new("validate", name), &descriptor, |b, raw| {
            b.iter(|| validate(black_box(raw), &config));
        });
    }
    group.finish();
}

fn bench_compilation(c: &mut Criterion) {
    let config = LazyLoadConfig::default();
    let mut group = c.benchmark_group("Compilation");

    for (name, descriptor) in [("simple", simple_descriptor()), ("complex", complex_descriptor())] {
        let Ok(validated) = validate(&descriptor, &config) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("compile", name), &validated, |b, validated| {
            b.iter(|| compile(black_box(validated), &Task::global_filter_fields()));
        });
    }
    group.finish();
}

fn bench_lazy_load(c: &mut Criterion) {
    let Ok(rt) = tokio::runtime::Runtime::new() else {
        return;
    };
    let mut group = c.benchmark_group("Lazy Load");
    group.measurement_time(Duration::from_secs(5));

    for rows in [100, 1_000] {
        let Ok(db) = rt.block_on(setup_database(rows)) else {
            continue;
        };
        for (name, descriptor) in [("simple", simple_descriptor()), ("complex", complex_descriptor())] {
            group.bench_with_input(
                BenchmarkId::new(name, rows),
                &descriptor,
                |b, raw| {
                    b.iter(|| rt.block_on(black_box(lazy_load::<Task>(&db, raw))));
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_validation, bench_compilation, bench_lazy_load);
criterion_main!(benches);
