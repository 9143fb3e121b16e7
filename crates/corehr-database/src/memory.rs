//! In-memory store implementations.
//!
//! Drop-in substitutes for the PostgreSQL stores, used by the test suites
//! and handy for local development without a database. They honor the
//! same contracts, including atomic rotation and the single-active
//! reset-token invariant.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use corehr_core::error::AppError;
use corehr_core::result::AppResult;
use corehr_core::traits::store::{AuditFilter, AuditStore, CredentialStore};
use corehr_core::traits::EmployeeDirectory;
use corehr_core::types::pagination::{PageRequest, PageResponse};
use corehr_entity::audit::{AuditLogEntry, NewAuditLogEntry};
use corehr_entity::token::{PasswordResetToken, RefreshToken};
use corehr_entity::user::{NewUser, User, UserUpdate};

#[derive(Default)]
struct CredentialState {
    users: HashMap<Uuid, User>,
    refresh_tokens: HashMap<String, RefreshToken>,
    reset_tokens: HashMap<String, PasswordResetToken>,
}

/// In-memory [`CredentialStore`].
#[derive(Default)]
pub struct MemoryCredentialStore {
    state: Mutex<CredentialState>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed user record, bypassing `create`. Useful for
    /// seeding fixtures with known IDs.
    pub fn seed_user(&self, user: User) {
        self.state.lock().unwrap().users.insert(user.id, user);
    }

    /// Snapshot of all stored refresh tokens.
    pub fn refresh_tokens(&self) -> Vec<RefreshToken> {
        self.state
            .lock()
            .unwrap()
            .refresh_tokens
            .values()
            .cloned()
            .collect()
    }

    /// Snapshot of all stored reset tokens.
    pub fn reset_tokens(&self) -> Vec<PasswordResetToken> {
        self.state
            .lock()
            .unwrap()
            .reset_tokens
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(&id).cloned())
    }

    async fn create(&self, data: &NewUser) -> AppResult<User> {
        let mut state = self.state.lock().unwrap();

        if state
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(AppError::conflict("Email is already in use"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            role: data.role,
            is_active: data.is_active,
            two_factor_enabled: false,
            two_factor_secret: None,
            employee_id: data.employee_id,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, data: &UserUpdate) -> AppResult<User> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

        if let Some(name) = &data.name {
            user.name = name.clone();
        }
        if let Some(email) = &data.email {
            user.email = email.clone();
        }
        if let Some(role) = data.role {
            user.role = role;
        }
        if let Some(is_active) = data.is_active {
            user.is_active = is_active;
        }
        if let Some(last_login_at) = data.last_login_at {
            user.last_login_at = Some(last_login_at);
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let state = self.state.lock().unwrap();
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = users.len() as u64;
        let items = users
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn find_by_refresh_token(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .refresh_tokens
            .get(token)
            .cloned())
    }

    async fn save_refresh_token(&self, record: &RefreshToken) -> AppResult<()> {
        self.state
            .lock()
            .unwrap()
            .refresh_tokens
            .insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn invalidate_refresh_token(&self, token: &str) -> AppResult<()> {
        self.state.lock().unwrap().refresh_tokens.remove(token);
        Ok(())
    }

    async fn invalidate_refresh_tokens_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.refresh_tokens.len();
        state.refresh_tokens.retain(|_, t| t.user_id != user_id);
        Ok((before - state.refresh_tokens.len()) as u64)
    }

    async fn rotate_refresh_token(
        &self,
        old_token: &str,
        new_record: &RefreshToken,
    ) -> AppResult<()> {
        // Single lock makes the delete+insert atomic.
        let mut state = self.state.lock().unwrap();

        if state.refresh_tokens.remove(old_token).is_none() {
            return Err(AppError::not_found("Refresh token not found"));
        }
        state
            .refresh_tokens
            .insert(new_record.token.clone(), new_record.clone());
        Ok(())
    }

    async fn save_password_reset_token(&self, record: &PasswordResetToken) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.reset_tokens.retain(|_, t| t.user_id != record.user_id);
        state
            .reset_tokens
            .insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn find_by_password_reset_token(
        &self,
        token: &str,
    ) -> AppResult<Option<PasswordResetToken>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .reset_tokens
            .get(token)
            .filter(|t| !t.is_expired())
            .cloned())
    }

    async fn remove_password_reset_token(&self, user_id: Uuid) -> AppResult<()> {
        self.state
            .lock()
            .unwrap()
            .reset_tokens
            .retain(|_, t| t.user_id != user_id);
        Ok(())
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn save_two_factor_secret(&self, user_id: Uuid, secret: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        user.two_factor_secret = Some(secret.to_string());
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn enable_two_factor(&self, user_id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        user.two_factor_enabled = true;
        user.updated_at = Utc::now();
        Ok(())
    }
}

/// In-memory [`AuditStore`].
#[derive(Default)]
pub struct MemoryAuditStore {
    entries: Mutex<Vec<AuditLogEntry>>,
}

impl MemoryAuditStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored entries, oldest first.
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn create(&self, entry: &NewAuditLogEntry) -> AppResult<AuditLogEntry> {
        let stored = AuditLogEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            action: entry.action,
            resource: entry.resource.clone(),
            resource_id: entry.resource_id.clone(),
            old_values: entry.old_values.clone(),
            new_values: entry.new_values.clone(),
            metadata: entry.metadata.clone(),
            ip_address: entry.ip_address.clone(),
            user_agent: entry.user_agent.clone(),
            created_at: Utc::now(),
        };
        self.entries.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn search(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let entries = self.entries.lock().unwrap();
        let mut matched: Vec<AuditLogEntry> = entries
            .iter()
            .filter(|e| filter.user_id.is_none_or(|id| e.user_id == Some(id)))
            .filter(|e| filter.action.is_none_or(|a| e.action == a))
            .filter(|e| {
                filter
                    .resource
                    .as_deref()
                    .is_none_or(|r| e.resource == r)
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }
}

/// In-memory [`EmployeeDirectory`] over an explicit manager mapping.
#[derive(Default)]
pub struct MemoryEmployeeDirectory {
    managers: Mutex<HashMap<Uuid, Uuid>>,
}

impl MemoryEmployeeDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `employee` reports to `manager`.
    pub fn set_manager(&self, employee: Uuid, manager: Uuid) {
        self.managers.lock().unwrap().insert(employee, manager);
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryEmployeeDirectory {
    async fn is_manager_of(
        &self,
        manager_employee_id: Uuid,
        employee_id: Uuid,
    ) -> AppResult<bool> {
        let managers = self.managers.lock().unwrap();

        let mut current = employee_id;
        for _ in 0..32 {
            match managers.get(&current) {
                Some(&manager) if manager == manager_employee_id => return Ok(true),
                Some(&manager) => current = manager,
                None => return Ok(false),
            }
        }
        Ok(false)
    }
}
