//! The fetch → merge → save → post sequence shared by every entry point.
//!
//! CLI commands and server routes each build one [`Handover`] and call into
//! it; none of them touch the store or the Slack payload directly.

use crate::config::Config;
use crate::edits;
use crate::error::Result;
use crate::jira::JiraClient;
use crate::paths;
use crate::slack::{self, Block, SlashResponse};
use crate::store::{apply_edits, AnnotationStore, Edits, FetchedTicket, UNSET};
use chrono::{Local, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One row of the edit view: a fetched ticket with its saved annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketView {
    pub key: String,
    pub summary: String,
    pub url: String,
    pub status: String,
    pub action: String,
}

/// Result of a save, with the delivery outcome when posting was requested.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub store: AnnotationStore,
    pub posted: Option<bool>,
}

pub struct Handover {
    config: Config,
    jira: JiraClient,
    store_path: PathBuf,
}

impl Handover {
    pub fn new(config: Config, root: &Path) -> Result<Self> {
        let jira = JiraClient::new(config.jira.clone(), config.timeout)?;
        Ok(Self {
            config,
            jira,
            store_path: paths::store_path(root),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn jira(&self) -> &JiraClient {
        &self.jira
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn fetch_tickets(&self) -> Result<Vec<FetchedTicket>> {
        self.jira.search()
    }

    pub fn load(&self) -> AnnotationStore {
        AnnotationStore::load(&self.store_path)
    }

    /// Fetched tickets joined with their saved status/action.
    pub fn view(&self) -> Result<Vec<TicketView>> {
        let fetched = self.fetch_tickets()?;
        let saved = self.load();
        Ok(fetched
            .into_iter()
            .map(|t| TicketView {
                url: paths::browse_url(&self.config.jira.base_url, &t.key),
                status: saved.status_of(&t.key).to_string(),
                action: saved.action_of(&t.key).to_string(),
                key: t.key,
                summary: t.summary,
            })
            .collect())
    }

    /// Save the submitted state of every visible ticket, then optionally post.
    ///
    /// Nothing is written when the fetch fails. Keys missing from the fetch
    /// keep their last known summary.
    pub fn submit(&self, edits: Edits, post: bool) -> Result<SubmitOutcome> {
        let fetched = self.fetch_tickets()?;
        self.merge_and_save(&fetched, edits, post)
    }

    /// Give every fetched ticket the same status and action.
    pub fn fill_all(&self, status: &str, action: &str, post: bool) -> Result<SubmitOutcome> {
        let fetched = self.fetch_tickets()?;
        let edits = edits::fill_all(&fetched, status, action);
        self.merge_and_save(&fetched, edits, post)
    }

    fn merge_and_save(
        &self,
        fetched: &[FetchedTicket],
        mut edits: Edits,
        post: bool,
    ) -> Result<SubmitOutcome> {
        let prior = self.load();

        for (key, edit) in edits.iter_mut() {
            if edit.summary.is_none() {
                edit.summary = prior.get(key).map(|r| r.summary.clone());
            }
        }

        let mut store = apply_edits(fetched, &edits, Utc::now());
        store.keep_monotonic(&prior);
        store.save(&self.store_path)?;
        tracing::info!(tickets = store.len(), path = %self.store_path.display(), "saved ticket data");

        let posted = post.then(|| self.post_store(&store));
        Ok(SubmitOutcome { store, posted })
    }

    /// Post the saved annotations for the currently fetched tickets.
    pub fn post_saved(&self) -> Result<bool> {
        let view = self.current_view()?;
        Ok(self.post_store(&view))
    }

    pub fn render(&self, store: &AnnotationStore) -> Vec<Block> {
        slack::format_notification(store, &self.config.jira.base_url, Local::now())
    }

    pub fn post_store(&self, store: &AnnotationStore) -> bool {
        let blocks = self.render(store);
        slack::post_notification(&self.config.slack, self.config.timeout, &blocks)
    }

    pub fn slash_response(&self) -> Result<SlashResponse> {
        let view = self.current_view()?;
        Ok(slack::slash_response(
            &view,
            &self.config.jira.base_url,
            Local::now(),
        ))
    }

    /// Plain-text handover of the fetched tickets that carry annotations.
    pub fn copy_text(&self) -> Result<String> {
        let view = self.current_view()?;
        if view.is_empty() {
            return Ok("No tickets in the handover queue.".to_string());
        }
        let mut annotated = AnnotationStore::new();
        for (key, record) in view.iter().filter(|(_, r)| r.has_annotation()) {
            annotated.insert(key, record.clone());
        }
        if annotated.is_empty() {
            return Ok(format!(
                "No tickets have handover status/action filled (all {UNSET})."
            ));
        }
        Ok(slack::format_plain_text(
            &annotated,
            &self.config.jira.base_url,
            Local::now(),
        ))
    }

    fn current_view(&self) -> Result<AnnotationStore> {
        let fetched = self.fetch_tickets()?;
        Ok(self.load().view_of(&fetched))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
