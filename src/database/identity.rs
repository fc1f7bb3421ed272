//! Identity store: registered users and credential checks.

use std::sync::Arc;

use crate::{
    error::{AuthError, RegistrationError, ValidationError},
    models::{NewUser, Role, User, UserId},
    utils::{hash_password, verify_password},
};

/// A validated registration with its password already hashed. Building one
/// needs no access to the store.
#[derive(Debug, Clone)]
pub struct PreparedUser {
    name: String,
    email: String,
    password_hash: String,
    role: Role,
    department: String,
}

impl PreparedUser {
    pub fn email(&self) -> &str {
        &self.email
    }
}

#[derive(Debug)]
pub struct IdentityStore {
    users: Vec<Arc<User>>,
    next_id: UserId,
    hash_cost: u32,
}

impl IdentityStore {
    pub fn new(hash_cost: u32) -> Self {
        Self {
            users: Vec::new(),
            next_id: 1,
            hash_cost,
        }
    }

    /// Both email (case-sensitive) and password must match.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Arc<User>, AuthError> {
        let user = self.find_by_email(email).ok_or(AuthError::InvalidCredentials)?;

        if verify_password(password, &user.password_hash).unwrap_or(false) {
            Ok(user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    pub fn hash_cost(&self) -> u32 {
        self.hash_cost
    }

    pub fn register(&mut self, candidate: NewUser) -> Result<Arc<User>, RegistrationError> {
        let prepared = Self::prepare(candidate, self.hash_cost)?;
        self.insert(prepared)
    }

    /// Validates required fields and hashes the password.
    pub fn prepare(candidate: NewUser, hash_cost: u32) -> Result<PreparedUser, RegistrationError> {
        let missing: Vec<&'static str> = [
            ("name", candidate.name.trim().is_empty()),
            ("email", candidate.email.trim().is_empty()),
            ("password", candidate.password.is_empty()),
            ("department", candidate.department.trim().is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, blank)| blank.then_some(field))
        .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing).into());
        }

        Ok(PreparedUser {
            password_hash: hash_password(&candidate.password, hash_cost)?,
            name: candidate.name.trim().to_string(),
            email: candidate.email,
            role: candidate.role.unwrap_or_default(),
            department: candidate.department.trim().to_string(),
        })
    }

    /// Adds a prepared user unless the email is already taken.
    pub fn insert(&mut self, prepared: PreparedUser) -> Result<Arc<User>, RegistrationError> {
        if self.find_by_email(&prepared.email).is_some() {
            return Err(RegistrationError::DuplicateEmail);
        }

        let user = Arc::new(User {
            id: self.next_id,
            name: prepared.name,
            email: prepared.email,
            password_hash: prepared.password_hash,
            role: prepared.role,
            department: prepared.department,
        });

        self.next_id += 1;
        self.users.push(Arc::clone(&user));
        Ok(user)
    }

    pub fn find_by_id(&self, id: UserId) -> Option<Arc<User>> {
        self.users.iter().find(|u| u.id == id).cloned()
    }

    pub fn find_by_email(&self, email: &str) -> Option<Arc<User>> {
        self.users.iter().find(|u| u.email == email).cloned()
    }

    pub fn users(&self) -> &[Arc<User>] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
