use serde::Serialize;

use crate::course::CourseItem;
use crate::pipeline::Counts;

// Plan envelope types
#[derive(Serialize)]
pub struct ItemSample {
    pub title: String,
    pub link: String,
    pub date_start: Option<String>,
    pub order: Option<f64>,
}

impl From<&CourseItem> for ItemSample {
    fn from(it: &CourseItem) -> Self {
        ItemSample {
            title: it.title.clone(),
            link: it.link.clone(),
            date_start: it.date_start.as_ref().map(|d| d.to_string()),
            order: it.order,
        }
    }
}

#[derive(Serialize)]
pub struct BuildPlan {
    pub source: String,
    pub payload: &'static str,
    pub output: String,
    pub counts: Counts,
    pub sample_items: Vec<ItemSample>,
}

// Apply/result envelope types
#[derive(Serialize)]
pub struct BuildResult {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<Counts>,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
