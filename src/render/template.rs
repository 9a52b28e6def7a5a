use askama::Template;
use askama_web::WebTemplate;

use super::view::MapView;

pub const TITLE: &str = "Aircraft trajectories";

#[derive(Debug, Clone)]
pub struct DateOption {
    pub key: String,
    pub label: String,
    pub count: usize,
}

#[derive(Template, WebTemplate)]
#[template(path = "map.html")]
pub struct MapTemplate {
    pub title: String,
    pub view_json: String,
    pub options: Vec<DateOption>,
    pub radius_nm: String,
    pub ceiling_ft: String,
    pub gradient_css: String,
    pub unknown_color: String,
    pub last_record: String,
    pub total: usize,
}

#[derive(Template, WebTemplate)]
#[template(path = "no_data.html")]
pub struct NoDataTemplate {
    pub title: String,
    pub reason: String,
}

impl MapTemplate {
    pub fn new(view: &MapView) -> Result<Self, serde_json::Error> {
        let stops: Vec<String> = view
            .legend
            .stops
            .iter()
            .map(|s| s.color.to_string())
            .collect();

        Ok(MapTemplate {
            title: TITLE.to_string(),
            view_json: script_json(view)?,
            options: view
                .layers
                .iter()
                .map(|l| DateOption {
                    key: l.key.clone(),
                    label: l.label.clone(),
                    count: l.trajectories.len(),
                })
                .collect(),
            radius_nm: format!("{}", view.surveillance.radius_nm),
            ceiling_ft: format!("{:.0}", view.legend.ceiling_ft),
            gradient_css: format!("linear-gradient(to right, {})", stops.join(", ")),
            unknown_color: view.legend.unknown.to_string(),
            last_record: view
                .last_record
                .clone()
                .unwrap_or_else(|| "never".to_string()),
            total: view.all_dates().trajectories.len(),
        })
    }
}

impl NoDataTemplate {
    pub fn new(reason: impl Into<String>) -> Self {
        NoDataTemplate {
            title: TITLE.to_string(),
            reason: reason.into(),
        }
    }
}

/// JSON that can sit inside a `<script>` element: `<` never appears raw.
pub fn script_json<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}
