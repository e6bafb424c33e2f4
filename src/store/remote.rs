use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::Response;
use serde::{Deserialize, Serialize};

use super::error::StoreError;
use crate::traits::RosterStore;
use crate::types::Member;
use crate::types::Roster;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One row of the remote table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRow {
    pub session_id: String,
    pub id: String,
    pub name: String,
    pub weight: f64,
    /// Roster position; rows are read back ordered by this.
    pub position: i64,
}

impl RemoteRow {
    fn from_member(session_id: &str, position: usize, member: &Member) -> Self {
        Self {
            session_id: session_id.to_string(),
            id: member.id.clone(),
            name: member.name.clone(),
            weight: member.weight,
            position: position as i64,
        }
    }

    fn into_member(self) -> Member {
        Member {
            id: self.id,
            name: self.name,
            weight: self.weight,
        }
    }
}

/// Roster store backed by a PostgREST-style REST table.
///
/// # Protocol
/// - GET `{url}/rest/v1/{table}?session_id=eq.{session}&order=position.asc` - load
/// - POST `{url}/rest/v1/{table}?on_conflict=session_id,id` - upsert rows
/// - DELETE `{url}/rest/v1/{table}?session_id=eq.{session}&id=not.in.(...)` - prune
///
/// Every request carries the `apikey` header and a bearer token with the same key.
pub struct RemoteStore {
    url: String,
    api_key: String,
    table: String,
    session_id: String,
    client: Option<Client>,
}

impl RemoteStore {
    pub fn new(url: String, api_key: String, table: String, session_id: String) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            api_key,
            table,
            session_id,
            client: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }

    fn client(&self) -> Result<&Client, StoreError> {
        self.client.as_ref().ok_or(StoreError::NotOpen("remote"))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", self.api_key.as_str())
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn upsert(&self, rows: &[RemoteRow]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let request = self
            .client()?
            .post(self.endpoint())
            .query(&[("on_conflict", "session_id,id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows);
        Self::check(self.authorized(request).send().await?).await?;
        Ok(())
    }

    /// Delete this session's rows whose id is not in `keep`.
    async fn prune(&self, keep: &[&str]) -> Result<(), StoreError> {
        let mut query = vec![("session_id", format!("eq.{}", self.session_id))];
        if !keep.is_empty() {
            let ids: Vec<String> = keep.iter().map(|id| quote_list_value(id)).collect();
            query.push(("id", format!("not.in.({})", ids.join(","))));
        }
        let request = self.client()?.delete(self.endpoint()).query(&query);
        Self::check(self.authorized(request).send().await?).await?;
        Ok(())
    }

    fn rows_for(&self, roster: &Roster) -> Vec<RemoteRow> {
        roster
            .iter()
            .enumerate()
            .map(|(position, member)| RemoteRow::from_member(&self.session_id, position, member))
            .collect()
    }
}

/// Quote a value for a PostgREST `in.(...)` list. Backslash and double quote are
/// escaped so ids containing `,`, `)` or quotes stay a single value.
fn quote_list_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[async_trait]
impl RosterStore for RemoteStore {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn load(&self) -> Result<Roster> {
        let request = self.client()?.get(self.endpoint()).query(&[
            ("select", "*".to_string()),
            ("session_id", format!("eq.{}", self.session_id)),
            ("order", "position.asc".to_string()),
        ]);
        let response = Self::check(
            self.authorized(request)
                .send()
                .await
                .map_err(StoreError::Transport)?,
        )
        .await?;
        let rows: Vec<RemoteRow> = response.json().await.map_err(StoreError::Transport)?;

        if rows.is_empty() {
            tracing::info!(
                "Remote store: session {} is empty, seeding default roster",
                self.session_id
            );
            let seeded = Roster::seeded();
            self.upsert(&self.rows_for(&seeded)).await?;
            return Ok(seeded);
        }

        tracing::debug!(
            "Remote store: loaded {} members for session {}",
            rows.len(),
            self.session_id
        );
        Ok(rows
            .into_iter()
            .map(RemoteRow::into_member)
            .collect::<Vec<_>>()
            .into())
    }

    /// Upsert every member, then delete rows for members no longer in the roster.
    ///
    /// The two steps are separate requests. If the delete fails after the upsert went
    /// through, removed members are still in the table and come back on the next load.
    async fn save(&self, roster: &Roster) -> Result<()> {
        self.upsert(&self.rows_for(roster)).await?;
        let keep: Vec<&str> = roster.iter().map(|m| m.id.as_str()).collect();
        if let Err(e) = self.prune(&keep).await {
            tracing::warn!(
                "Remote store: members saved but removed rows were not deleted for session {}: {}",
                self.session_id,
                e
            );
            return Err(e.into());
        }
        tracing::debug!(
            "Remote store: saved {} members for session {}",
            roster.len(),
            self.session_id
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        let request = self
            .client()?
            .get(self.endpoint())
            .query(&[("select", "id"), ("limit", "1")]);
        Self::check(
            self.authorized(request)
                .send()
                .await
                .map_err(StoreError::Transport)?,
        )
        .await?;
        Ok(())
    }

    async fn open(&mut self) -> Result<()> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(StoreError::Transport)?;
        self.client = Some(client);
        tracing::info!(
            "Remote store: initialized for {} (table={}, session={})",
            self.url,
            self.table,
            self.session_id
        );
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.client = None;
        Ok(())
    }
}
