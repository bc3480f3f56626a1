//! User seeding for first-run setup.
//!
//! Accounts live in a small JSON document file next to the review data.
//! Seeding an email that already exists is a skip, not an error.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// A seeded user account
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a seed attempt
#[derive(Clone, Debug)]
pub enum SeedOutcome {
    Created(UserRecord),
    AlreadyExists,
}

/// Seed a user into the accounts file, skipping duplicates by email
pub fn seed_user(path: &Path, email: &str, password: &str) -> Result<SeedOutcome> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(Error::Seed(
            "both email and password are required to seed a user".into(),
        ));
    }

    let mut users = load_users(path)?;

    if users.iter().any(|u| u.email == email) {
        tracing::info!("User with email \"{}\" already exists, skipping", email);
        return Ok(SeedOutcome::AlreadyExists);
    }

    let record = UserRecord {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password: password.to_string(),
        created_at: Utc::now(),
    };

    users.push(record.clone());
    save_users(path, &users)?;

    tracing::info!("Seeded user \"{}\" ({})", record.email, record.id);
    Ok(SeedOutcome::Created(record))
}

fn load_users(path: &Path) -> Result<Vec<UserRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    let read_result = reader.read_to_string(&mut contents);
    file.unlock()?;
    read_result?;

    Ok(serde_json::from_str(&contents)?)
}

fn save_users(path: &Path, users: &[UserRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "users path missing parent")
    })?)?;

    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string(users)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_creates_user() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("users.json");

        let outcome = seed_user(&path, "admin@example.com", "password123").unwrap();
        assert!(matches!(outcome, SeedOutcome::Created(_)));

        let users = load_users(&path).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "admin@example.com");
    }

    #[test]
    fn test_duplicate_email_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("users.json");

        seed_user(&path, "admin@example.com", "password123").unwrap();
        let outcome = seed_user(&path, "admin@example.com", "other").unwrap();

        assert!(matches!(outcome, SeedOutcome::AlreadyExists));
        assert_eq!(load_users(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_blank_credentials_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("users.json");

        assert!(seed_user(&path, "", "password").is_err());
        assert!(seed_user(&path, "a@b.c", "  ").is_err());
        assert!(!path.exists());
    }
}
