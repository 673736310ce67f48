use crate::vote::VoteCounts;
use serde::{Deserialize, Deserializer, Serialize};

/// A bill as the backend projects it, vote aggregates included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bill_no: i64,
    pub bill_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub propose_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub agree_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disagree_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_voted: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary_content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary_background: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary_highlight: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary_effect: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary_line: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub proposer_kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub proposer: String,
}

impl Bill {
    pub fn counts(&self) -> VoteCounts {
        VoteCounts {
            agree: self.agree_count,
            disagree: self.disagree_count,
            total: self.total_count,
        }
    }

    pub fn highlight(&self) -> &str {
        strip_square_brackets(&self.summary_highlight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillPage {
    pub content: Vec<Bill>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl BillPage {
    /// Bills whose tag matches exactly; `None` keeps everything.
    pub fn with_tag<'a>(&'a self, tag: Option<&'a str>) -> impl Iterator<Item = &'a Bill> + 'a {
        self.content
            .iter()
            .filter(move |bill| tag.map_or(true, |t| bill.tag == t))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub confer_num: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub class_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dae_num: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conf_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vod_link_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conf_link_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pdf_link_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conf_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discussion_items: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

/// Cursor page of meetings; `next_cursor` is the id to resume after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingPage {
    pub meetings: Vec<Meeting>,
    pub size: u32,
    pub has_next: bool,
    pub next_cursor: Option<i64>,
    pub total_count: Option<i64>,
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Drops one leading `[` and one trailing `]`.
pub fn strip_square_brackets(text: &str) -> &str {
    let text = text.strip_prefix('[').unwrap_or(text);
    text.strip_suffix(']').unwrap_or(text)
}

/// Summary fields are sometimes a JSON array encoded as a string.
pub fn parse_maybe_json_array(value: &str) -> Vec<String> {
    match serde_json::from_str::<serde_json::Value>(value) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Ok(serde_json::Value::String(s)) => vec![s],
        Ok(other) => vec![other.to_string()],
        Err(_) => vec![value.to_string()],
    }
}

/// Page numbers (zero-based) to show around `current`, at most `width` wide.
pub fn page_window(current: u32, total_pages: u32, width: u32) -> Vec<u32> {
    if total_pages == 0 || width == 0 {
        return Vec::new();
    }
    let width = width.min(total_pages);
    let half = width / 2;
    let start = current
        .saturating_sub(half)
        .min(total_pages - width);
    (start..start + width).collect()
}
