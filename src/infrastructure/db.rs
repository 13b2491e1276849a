use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);

    // Every pooled connection to an in-memory SQLite URL opens its own empty
    // database, so tests and throwaway runs must share a single connection.
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;

    // SQLite ignores REFERENCES clauses unless this is on for the connection
    execute(&db, "PRAGMA foreign_keys = ON").await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await?;
    Ok(())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create users table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Create classifications table (top level of the book classification)
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS classifications (
            code CHAR(3) PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Create classification_details table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS classification_details (
            code CHAR(3) PRIMARY KEY NOT NULL,
            classification_code CHAR(3) NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (classification_code) REFERENCES classifications(code)
                ON UPDATE CASCADE ON DELETE RESTRICT
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_classification_details_classification ON classification_details(classification_code)",
    )
    .await?;

    // Create divisions table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS divisions (
            code CHAR(2) PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Create books table. The id is a ULID generated by the application.
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id CHAR(26) PRIMARY KEY NOT NULL CHECK (length(id) = 26),
            title TEXT NOT NULL,
            author TEXT,
            publisher TEXT,
            published_on TEXT,
            isbn TEXT,
            classification_detail_code CHAR(3) NOT NULL,
            division_code CHAR(2) NOT NULL,
            is_disposed INTEGER NOT NULL DEFAULT 0,
            disposed_on TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (classification_detail_code) REFERENCES classification_details(code)
                ON UPDATE CASCADE ON DELETE RESTRICT,
            FOREIGN KEY (division_code) REFERENCES divisions(code)
                ON UPDATE CASCADE ON DELETE RESTRICT
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_books_classification_detail ON books(classification_detail_code)",
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_books_division ON books(division_code)",
    )
    .await?;

    Ok(())
}
