use thiserror::Error;

use crate::database::{Database, DatabaseError};
use crate::models::UserProfile;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Database error: {0}")]
    Store(DatabaseError),
    #[error("A profile already exists and cannot be changed")]
    AlreadyExists,
    #[error("No profile yet. Create one with: focuslog profile set --name <name> --role <role> --goals <goals> --challenges <challenges> --style <direct|supportive|formal>")]
    Missing,
    #[error("Invalid profile: {0}")]
    Invalid(String),
}

impl From<DatabaseError> for ProfileError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::ProfileExists => ProfileError::AlreadyExists,
            other => ProfileError::Store(other),
        }
    }
}

pub fn load(db: &Database) -> Result<Option<UserProfile>, ProfileError> {
    Ok(db.load_profile()?)
}

/// The stored profile, or `Missing` before onboarding
pub fn require(db: &Database) -> Result<UserProfile, ProfileError> {
    load(db)?.ok_or(ProfileError::Missing)
}

/// Store the profile once; it is read-only afterwards
pub fn create(db: &Database, profile: &UserProfile) -> Result<(), ProfileError> {
    profile.validate().map_err(ProfileError::Invalid)?;
    db.save_profile(profile)?;
    tracing::info!(name = %profile.name, "user profile created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommunicationStyle;

    fn sample_profile() -> UserProfile {
        UserProfile {
            name: "Mei".to_string(),
            role: "Engineer".to_string(),
            goals: "Ship v2".to_string(),
            challenges: "Meetings".to_string(),
            communication_style: CommunicationStyle::Direct,
        }
    }

    #[test]
    fn profile_is_required_until_created() {
        let db = Database::open_in_memory().expect("db");
        assert!(matches!(require(&db), Err(ProfileError::Missing)));
        create(&db, &sample_profile()).expect("create");
        assert_eq!(require(&db).expect("profile"), sample_profile());
    }

    #[test]
    fn second_create_is_rejected() {
        let db = Database::open_in_memory().expect("db");
        create(&db, &sample_profile()).expect("create");
        let mut changed = sample_profile();
        changed.name = "Someone else".to_string();
        assert!(matches!(create(&db, &changed), Err(ProfileError::AlreadyExists)));
        assert_eq!(require(&db).expect("profile").name, "Mei");
    }

    #[test]
    fn invalid_profile_is_not_stored() {
        let db = Database::open_in_memory().expect("db");
        let mut blank = sample_profile();
        blank.name = "  ".to_string();
        assert!(matches!(create(&db, &blank), Err(ProfileError::Invalid(_))));
        assert!(load(&db).expect("load").is_none());
    }
}
