use crate::course::CourseItem;

/// Body of a feed item. `Verbatim` is caller-provided markup and is emitted
/// untouched; `Synthesized` rows are escaped on render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Description {
    Verbatim(String),
    Synthesized(Vec<Row>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub label: &'static str,
    pub value: String,
}

impl Description {
    pub fn for_item(item: &CourseItem, show_completion: bool) -> Self {
        if let Some(html) = item.raw_description_html.as_deref().filter(|h| !h.trim().is_empty()) {
            return Description::Verbatim(html.to_string());
        }

        let mut candidates: Vec<(&'static str, Option<String>)> = vec![
            ("Lieu & dates", item.lieu_et_date.clone()),
            ("Durée", item.nb_jours.clone()),
            ("Prix", item.prix.clone()),
        ];
        if show_completion {
            candidates.push(("Complet", Some(if item.complet { "oui" } else { "non" }.to_string())));
        }

        let rows = candidates
            .into_iter()
            .filter_map(|(label, value)| {
                let value = value?;
                if value.trim().is_empty() { None } else { Some(Row { label, value }) }
            })
            .collect();
        Description::Synthesized(rows)
    }

    pub fn render(&self) -> String {
        match self {
            Description::Verbatim(html) => html.clone(),
            Description::Synthesized(rows) => {
                let trs = rows
                    .iter()
                    .map(|r| {
                        format!(
                            "<tr><th style=\"text-align:left;padding:4px 8px;\">{}</th><td style=\"padding:4px 8px;\">{}</td></tr>",
                            html_escape::encode_text(r.label),
                            html_escape::encode_text(&r.value)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("<table>{trs}</table>")
            }
        }
    }
}
