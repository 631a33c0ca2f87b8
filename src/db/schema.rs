//! Database schema and migrations for fileshare.

/// Database migrations.
///
/// Each entry is applied once, in order, inside its own transaction. The
/// `schema_version` table records which entries have run.
pub const MIGRATIONS: &[&str] = &[
    // v1: users and login sessions
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE COLLATE NOCASE,
    name        TEXT NOT NULL,
    password    TEXT NOT NULL,           -- Argon2 hash
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE sessions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token       TEXT NOT NULL UNIQUE,
    expires_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_sessions_user_id ON sessions(user_id);
CREATE INDEX idx_sessions_expires_at ON sessions(expires_at);
"#,
    // v2: visibility options
    r#"
CREATE TABLE visibilities (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL
);

INSERT INTO visibilities (id, name, description) VALUES
    (1, 'private', 'Only you can view this folder'),
    (2, 'public', 'Anyone can view this folder');
"#,
    // v3: folders and files
    r#"
CREATE TABLE folders (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL COLLATE NOCASE,
    description     TEXT,
    visibility_id   INTEGER NOT NULL REFERENCES visibilities(id),
    user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (user_id, name)
);

CREATE INDEX idx_folders_user_id ON folders(user_id);

CREATE TABLE files (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    description     TEXT,
    visibility_id   INTEGER NOT NULL REFERENCES visibilities(id),
    folder_id       INTEGER NOT NULL REFERENCES folders(id) ON DELETE CASCADE,
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (folder_id, name)
);

CREATE INDEX idx_files_folder_id ON files(folder_id);
CREATE INDEX idx_files_created_at ON files(created_at);
"#,
];
