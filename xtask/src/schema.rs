// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-neutral schema snapshots for migration parity checks.
//!
//! Column types are reduced to `integer`, `real`, `text` or `blob` so the
//! two dialects compare structurally.

use std::collections::{BTreeMap, BTreeSet};

use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{MysqlConnection, QueryableByName, RunQueryDsl, SqliteConnection};

/// Table name excluded from comparison.
const MIGRATIONS_TABLE: &str = "__diesel_schema_migrations";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: BTreeMap<String, Column>,
    pub primary_keys: BTreeSet<String>,
    pub foreign_keys: BTreeSet<ForeignKey>,
    /// Column lists of unique constraints.
    pub unique_constraints: BTreeSet<Vec<String>>,
    /// Column lists of non-unique indexes.
    pub indexes: BTreeSet<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub normalized_type: &'static str,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ForeignKey {
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

/// Reads the schema of a migrated `SQLite` database.
pub fn introspect_sqlite(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Integer)]
        unique: i32,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let tables: Vec<TableName> = diesel::sql_query(format!(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '{MIGRATIONS_TABLE}' ORDER BY name"
    ))
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    let mut schema = Schema::default();
    for table in tables {
        let mut info = Table::default();

        let columns: Vec<ColumnInfo> = diesel::sql_query(format!("PRAGMA table_info({})", table.name))
            .load(conn)
            .wrap_err_with(|| format!("Failed to get columns for table {}", table.name))?;
        for col in columns {
            if col.pk > 0 {
                info.primary_keys.insert(col.name.clone());
            }
            info.columns.insert(
                col.name,
                Column {
                    normalized_type: normalize_sqlite_type(&col.r#type),
                    nullable: col.notnull == 0,
                },
            );
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err_with(|| format!("Failed to get foreign keys for table {}", table.name))?;
        info.foreign_keys.extend(fks.into_iter().map(|fk| ForeignKey {
            from_column: fk.from,
            to_table: fk.table,
            to_column: fk.to,
        }));

        let indexes: Vec<IndexInfo> = diesel::sql_query(format!("PRAGMA index_list({})", table.name))
            .load(conn)
            .wrap_err_with(|| format!("Failed to get indexes for table {}", table.name))?;
        for idx in indexes {
            // Primary-key autoindexes are covered by `primary_keys`
            if idx.origin == "pk" {
                continue;
            }
            let columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err_with(|| format!("Failed to get index columns for {}", idx.name))?;
            let names: Vec<String> = columns.into_iter().map(|c| c.name).collect();

            if idx.unique == 1 {
                info.unique_constraints.insert(names);
            } else {
                info.indexes.insert(names);
            }
        }

        schema.tables.insert(table.name, info);
    }

    Ok(schema)
}

/// Reads the schema of a migrated `MySQL` database.
pub fn introspect_mysql(conn: &mut MysqlConnection, database: &str) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        table_name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        data_type: String,
        #[diesel(sql_type = Text)]
        is_nullable: String,
        #[diesel(sql_type = Text)]
        column_key: String,
    }

    #[derive(QueryableByName)]
    #[allow(clippy::struct_field_names)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        referenced_table_name: String,
        #[diesel(sql_type = Text)]
        referenced_column_name: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        index_name: String,
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Integer)]
        non_unique: i32,
    }

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT table_name AS table_name FROM information_schema.tables WHERE table_schema = ? AND table_name != ? ORDER BY table_name",
    )
    .bind::<Text, _>(database)
    .bind::<Text, _>(MIGRATIONS_TABLE)
    .load(conn)
    .wrap_err("Failed to query MySQL tables")?;

    let mut schema = Schema::default();
    for table in tables {
        let mut info = Table::default();

        let columns: Vec<ColumnInfo> = diesel::sql_query(
            "SELECT column_name AS column_name, data_type AS data_type, is_nullable AS is_nullable, \
             column_key AS column_key FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
        )
        .bind::<Text, _>(database)
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err_with(|| format!("Failed to get columns for table {}", table.table_name))?;
        for col in columns {
            if col.column_key == "PRI" {
                info.primary_keys.insert(col.column_name.clone());
            }
            info.columns.insert(
                col.column_name,
                Column {
                    normalized_type: normalize_mysql_type(&col.data_type),
                    nullable: col.is_nullable == "YES",
                },
            );
        }

        let fks: Vec<ForeignKeyInfo> = diesel::sql_query(
            "SELECT column_name AS column_name, referenced_table_name AS referenced_table_name, \
             referenced_column_name AS referenced_column_name \
             FROM information_schema.key_column_usage \
             WHERE table_schema = ? AND table_name = ? AND referenced_table_name IS NOT NULL",
        )
        .bind::<Text, _>(database)
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err_with(|| format!("Failed to get foreign keys for table {}", table.table_name))?;
        info.foreign_keys.extend(fks.into_iter().map(|fk| ForeignKey {
            from_column: fk.column_name,
            to_table: fk.referenced_table_name,
            to_column: fk.referenced_column_name,
        }));

        // Unique constraints are backed by unique indexes in InnoDB
        let indexes: Vec<IndexInfo> = diesel::sql_query(
            "SELECT index_name AS index_name, column_name AS column_name, non_unique AS non_unique \
             FROM information_schema.statistics \
             WHERE table_schema = ? AND table_name = ? AND index_name != 'PRIMARY' \
             ORDER BY index_name, seq_in_index",
        )
        .bind::<Text, _>(database)
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err_with(|| format!("Failed to get indexes for table {}", table.table_name))?;

        let mut grouped: BTreeMap<String, (bool, Vec<String>)> = BTreeMap::new();
        for idx in indexes {
            let entry = grouped
                .entry(idx.index_name)
                .or_insert_with(|| (idx.non_unique == 0, Vec::new()));
            entry.1.push(idx.column_name);
        }
        for (unique, columns) in grouped.into_values() {
            if unique {
                info.unique_constraints.insert(columns);
            } else {
                info.indexes.insert(columns);
            }
        }

        schema.tables.insert(table.table_name, info);
    }

    Ok(schema)
}

/// Reduces a `SQLite` declared type to its affinity.
pub fn normalize_sqlite_type(sqlite_type: &str) -> &'static str {
    let upper = sqlite_type.to_uppercase();
    if upper.contains("INT") {
        "integer"
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        "real"
    } else if upper.contains("BLOB") {
        "blob"
    } else {
        "text"
    }
}

/// Reduces a `MySQL` data type to the matching `SQLite` affinity.
pub fn normalize_mysql_type(mysql_type: &str) -> &'static str {
    match mysql_type.to_uppercase().as_str() {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => "integer",
        "DECIMAL" | "NUMERIC" | "FLOAT" | "DOUBLE" | "REAL" => "real",
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => "blob",
        _ => "text",
    }
}

/// Lists every structural difference between the two schemas.
///
/// `MySQL` may carry extra single-column indexes on foreign-key columns,
/// which `InnoDB` creates on its own.
pub fn compare(sqlite: &Schema, mysql: &Schema) -> Vec<String> {
    let mut mismatches: Vec<String> = Vec::new();

    for name in sqlite.tables.keys() {
        if !mysql.tables.contains_key(name) {
            mismatches.push(format!("table '{name}' exists in SQLite but not in MySQL"));
        }
    }
    for name in mysql.tables.keys() {
        if !sqlite.tables.contains_key(name) {
            mismatches.push(format!("table '{name}' exists in MySQL but not in SQLite"));
        }
    }

    for (name, lite) in &sqlite.tables {
        if let Some(my) = mysql.tables.get(name) {
            compare_table(name, lite, my, &mut mismatches);
        }
    }

    mismatches
}

fn compare_table(name: &str, lite: &Table, my: &Table, mismatches: &mut Vec<String>) {
    for (column, lite_col) in &lite.columns {
        match my.columns.get(column) {
            None => mismatches.push(format!("column '{name}.{column}' missing in MySQL")),
            Some(my_col) => {
                if lite_col.normalized_type != my_col.normalized_type {
                    mismatches.push(format!(
                        "column '{name}.{column}' type differs: SQLite {}, MySQL {}",
                        lite_col.normalized_type, my_col.normalized_type
                    ));
                }
                if lite_col.nullable != my_col.nullable {
                    mismatches.push(format!(
                        "column '{name}.{column}' nullability differs: SQLite {}, MySQL {}",
                        lite_col.nullable, my_col.nullable
                    ));
                }
            }
        }
    }
    for column in my.columns.keys() {
        if !lite.columns.contains_key(column) {
            mismatches.push(format!("column '{name}.{column}' missing in SQLite"));
        }
    }

    if lite.primary_keys != my.primary_keys {
        mismatches.push(format!(
            "primary key of '{name}' differs: SQLite {:?}, MySQL {:?}",
            lite.primary_keys, my.primary_keys
        ));
    }
    if lite.foreign_keys != my.foreign_keys {
        mismatches.push(format!(
            "foreign keys of '{name}' differ: SQLite {:?}, MySQL {:?}",
            lite.foreign_keys, my.foreign_keys
        ));
    }
    if lite.unique_constraints != my.unique_constraints {
        mismatches.push(format!(
            "unique constraints of '{name}' differ: SQLite {:?}, MySQL {:?}",
            lite.unique_constraints, my.unique_constraints
        ));
    }

    for columns in lite.indexes.difference(&my.indexes) {
        mismatches.push(format!("index on '{name}' {columns:?} missing in MySQL"));
    }
    let fk_columns: BTreeSet<&String> = my.foreign_keys.iter().map(|fk| &fk.from_column).collect();
    for columns in my.indexes.difference(&lite.indexes) {
        let implicit_fk_index = columns.len() == 1 && fk_columns.contains(&columns[0]);
        if !implicit_fk_index {
            mismatches.push(format!("index on '{name}' {columns:?} exists only in MySQL"));
        }
    }
}
