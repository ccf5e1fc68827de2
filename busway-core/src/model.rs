//! User record types
//!
//! `NewUser` is the only way to build a row for insertion, so the
//! "all six fields present" rule is checked once, here. `UserUpdate` always
//! carries a full row: blank replacements fall back to the stored value.

use sqlx::FromRow;

use crate::error::{StoreError, StoreResult};

/// Store-assigned identifier (PostgreSQL `SERIAL`)
pub type UserId = i32;

/// A stored user row
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Stored as given. There is no hashing scheme.
    pub password: String,
    pub national_id: String,
    pub city: String,
    pub region: String,
}

/// Validated input for creating a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub national_id: String,
    pub city: String,
    pub region: String,
}

impl NewUser {
    /// Trim every field and reject the record if any of them ends up empty.
    pub fn new(
        name: &str,
        email: &str,
        password: &str,
        national_id: &str,
        city: &str,
        region: &str,
    ) -> StoreResult<Self> {
        Ok(Self {
            name: required("name", name)?,
            email: required("email", email)?,
            password: required("password", password)?,
            national_id: required("national_id", national_id)?,
            city: required("city", city)?,
            region: required("region", region)?,
        })
    }

    /// Attach the identifier the store handed back.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
            national_id: self.national_id,
            city: self.city,
            region: self.region,
        }
    }
}

fn required(field: &'static str, value: &str) -> StoreResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::missing_field(field));
    }
    Ok(value.to_string())
}

/// Full-row rewrite of an existing user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub national_id: String,
    pub city: String,
    pub region: String,
}

impl UserUpdate {
    /// Start from the stored row; every field keeps its current value.
    pub fn from_current(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            national_id: user.national_id.clone(),
            city: user.city.clone(),
            region: user.region.clone(),
        }
    }

    pub fn name(mut self, input: &str) -> Self {
        replace_unless_blank(&mut self.name, input);
        self
    }

    pub fn email(mut self, input: &str) -> Self {
        replace_unless_blank(&mut self.email, input);
        self
    }

    pub fn password(mut self, input: &str) -> Self {
        replace_unless_blank(&mut self.password, input);
        self
    }

    pub fn national_id(mut self, input: &str) -> Self {
        replace_unless_blank(&mut self.national_id, input);
        self
    }

    pub fn city(mut self, input: &str) -> Self {
        replace_unless_blank(&mut self.city, input);
        self
    }

    pub fn region(mut self, input: &str) -> Self {
        replace_unless_blank(&mut self.region, input);
        self
    }

    pub fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password: self.password,
            national_id: self.national_id,
            city: self.city,
            region: self.region,
        }
    }
}

fn replace_unless_blank(slot: &mut String, input: &str) {
    let input = input.trim();
    if !input.is_empty() {
        *slot = input.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> User {
        NewUser::new("Ana", "ana@x.com", "p1", "111", "Recife", "PE")
            .unwrap()
            .into_user(7)
    }

    #[test]
    fn new_user_trims_fields() {
        let user = NewUser::new("  Ana ", "ana@x.com\n", "p1", " 111", "Recife", "PE ").unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.email, "ana@x.com");
        assert_eq!(user.national_id, "111");
        assert_eq!(user.region, "PE");
    }

    #[test]
    fn new_user_rejects_blank_field() {
        let err = NewUser::new("Ana", "ana@x.com", "p1", "111", "   ", "PE").unwrap_err();
        assert!(matches!(err, StoreError::MissingField { field: "city" }));

        let err = NewUser::new("", "", "", "", "", "").unwrap_err();
        assert!(matches!(err, StoreError::MissingField { field: "name" }));
    }

    #[test]
    fn update_with_blanks_keeps_current_values() {
        let current = ana();
        let updated = UserUpdate::from_current(&current)
            .name("")
            .email("  ")
            .national_id("")
            .city("Olinda")
            .region("")
            .into_user();

        assert_eq!(updated.city, "Olinda");
        assert_eq!(
            User {
                city: current.city.clone(),
                ..updated
            },
            current
        );
    }

    #[test]
    fn update_replaces_supplied_values_exactly() {
        let updated = UserUpdate::from_current(&ana())
            .name(" Beatriz ")
            .password("p2")
            .into_user();

        assert_eq!(updated.id, 7);
        assert_eq!(updated.name, "Beatriz");
        assert_eq!(updated.password, "p2");
        assert_eq!(updated.email, "ana@x.com");
    }
}
