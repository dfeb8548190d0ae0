use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::domain::{ChannelInfo, DeletionRecord, PeerId, Statistics, UserProfile};
use crate::{Error, Result};

/// Tag identifying the pipeline generation that produced a report file.
pub const EXTRACTION_METHOD: &str = "optimized_batch_v3";

#[derive(Clone, Debug, Serialize)]
pub struct ReportMetadata {
    pub channel_id: i64,
    pub channel_title: String,
    /// Local wall-clock time, `YYYY-MM-DD HH:MM:SS`.
    pub scrape_date: String,
    pub statistics: Statistics,
    pub unique_users: usize,
    pub extraction_method: &'static str,
}

/// The final, write-once artifact of a run.
///
/// The on-disk shape is a stable contract: `metadata`, `user_cache` keyed by
/// stringified id, and `messages` in admin-log order with ISO-8601 dates.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub user_cache: BTreeMap<String, UserProfile>,
    pub messages: Vec<DeletionRecord>,
}

impl Report {
    pub fn assemble(
        channel: &ChannelInfo,
        statistics: Statistics,
        cache: HashMap<PeerId, UserProfile>,
        messages: Vec<DeletionRecord>,
        scraped_at: DateTime<Local>,
    ) -> Self {
        let user_cache: BTreeMap<String, UserProfile> = cache
            .into_iter()
            .map(|(id, profile)| (id.0.to_string(), profile))
            .collect();
        Self {
            metadata: ReportMetadata {
                channel_id: channel.id,
                channel_title: channel.title.clone(),
                scrape_date: scraped_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                statistics,
                unique_users: user_cache.len(),
                extraction_method: EXTRACTION_METHOD,
            },
            user_cache,
            messages,
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "deleted_messages_optimized_{}.json",
            self.metadata.channel_id
        )
    }

    /// Write the pretty-printed report into `dir` and return its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(&path, json).map_err(|e| Error::Report {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> Report {
        let channel = ChannelInfo {
            id: -1001234,
            title: "test channel".into(),
        };
        let mut cache = HashMap::new();
        cache.insert(PeerId(42), UserProfile::failed(PeerId(42), "not found"));
        let scraped_at = Local.with_ymd_and_hms(2024, 5, 2, 9, 30, 5).unwrap();
        Report::assemble(&channel, Statistics::default(), cache, Vec::new(), scraped_at)
    }

    #[test]
    fn file_name_embeds_the_channel_id() {
        assert_eq!(
            sample().file_name(),
            "deleted_messages_optimized_-1001234.json"
        );
    }

    #[test]
    fn serialized_shape_matches_the_contract() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["metadata"]["channel_id"], -1001234);
        assert_eq!(json["metadata"]["scrape_date"], "2024-05-02 09:30:05");
        assert_eq!(json["metadata"]["unique_users"], 1);
        assert_eq!(json["metadata"]["extraction_method"], EXTRACTION_METHOD);
        assert_eq!(json["metadata"]["statistics"]["total"], 0);
        assert_eq!(json["user_cache"]["42"]["error"], "not found");
        assert!(json["messages"].as_array().unwrap().is_empty());
    }
}
