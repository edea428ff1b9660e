//! `Database` trait — single async interface for lead and message
//! persistence.
//!
//! Every call from the engine is fire-and-forget: failures are logged and
//! swallowed, never surfaced to the visitor.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DatabaseError;
use crate::session::ContactInfo;

/// A persisted transcript message.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub id: String,
    pub session_id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted lead — a completed contact submission.
#[derive(Debug, Clone)]
pub struct StoredLead {
    pub id: String,
    pub session_id: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub service: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Backend-agnostic persistence for messages and leads.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    /// Append a transcript message. Returns the generated UUID string.
    async fn save_message(
        &self,
        session_id: &str,
        role: &str,
        content: &str,
    ) -> Result<String, DatabaseError>;

    /// Record a completed lead. Returns the generated UUID string.
    async fn save_lead(
        &self,
        session_id: &str,
        contact: &ContactInfo,
        service: &str,
        description: &str,
    ) -> Result<String, DatabaseError>;

    /// Messages for one session, oldest first.
    async fn list_session_messages(
        &self,
        session_id: &str,
    ) -> Result<Vec<StoredMessage>, DatabaseError>;

    /// Most recent leads, newest first, up to `limit`.
    async fn list_leads(&self, limit: usize) -> Result<Vec<StoredLead>, DatabaseError>;
}
