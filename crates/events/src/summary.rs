//! HTML summary of changed thresholds.
//!
//! One paragraph block per record: type and scope, the active value pair as
//! whole percentages, who updated it and when, and who approved it. Values
//! are rendered through handlebars so free-text fields are HTML-escaped.

use dx_core::threshold_type::ThresholdType;
use dx_core::types::Timestamp;
use dx_db::models::threshold::Threshold;
use handlebars::Handlebars;
use rust_decimal::Decimal;
use serde::Serialize;

/// Subject line of the summary e-mail.
pub const SUMMARY_SUBJECT: &str = "Thresholds Update";

const SUMMARY_TEMPLATE: &str = "threshold-summary";

const SUMMARY_BODY: &str = r#"<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Threshold Update</title>
</head>
<body>
    <div>
        <p style="margin-bottom: 20px;">Dear User,</p>
        <p style="margin-bottom: 20px;">This is to inform you that a threshold has been updated in the DX Dashboard. Please see details below:</p>
{{#each thresholds}}
        <p style="margin: 0px;"><b>Threshold:</b> {{type_label}} - {{scope}}</p>
        <p style="margin: 0px;"><b>Threshold Value:</b> {{warning_label}}: {{warning_value}} | {{full_label}}: {{full_value}}</p>
        <p style="margin: 0px;"><b>Updated By:</b> {{updated_by}}</p>
        <p style="margin: 0px;"><b>Updated Date:</b> {{updated_date}}</p>
        <p style="margin: 0px; margin-bottom: 20px;"><b>Approved By:</b> {{approved_by}}</p>
{{/each}}
        <p style="margin: 20px 0;">You may log into the system and navigate to the <b>Settings Page</b> to review the updated thresholds.</p>
        <p style="color: red;"><i>This is a system-generated notification. Please do not reply to this email.</i></p>
    </div>
</body>
</html>
"#;

#[derive(Debug, Serialize)]
struct SummaryData {
    thresholds: Vec<SummaryEntry>,
}

#[derive(Debug, PartialEq, Serialize)]
struct SummaryEntry {
    type_label: &'static str,
    scope: String,
    warning_label: &'static str,
    warning_value: String,
    full_label: &'static str,
    full_value: String,
    updated_by: String,
    updated_date: String,
    approved_by: String,
}

impl SummaryEntry {
    fn from_threshold(threshold: &Threshold) -> Self {
        // Anything that is not a detection specialist record reads as a group.
        let ty = threshold.threshold_type().unwrap_or(ThresholdType::Group);
        let (warning, full) = threshold.active_values();

        // Inserted records carry no update stamp yet; fall back to creation.
        let updated_by = threshold
            .updated_by
            .as_ref()
            .or(threshold.created_by.as_ref());
        let updated_date = threshold.updated_date.or(threshold.created_date);

        Self {
            type_label: ty.label(),
            scope: threshold
                .group_id
                .map_or_else(|| "Default".to_string(), |id| id.to_string()),
            warning_label: ty.warning_label(),
            warning_value: format_percent(warning),
            full_label: ty.full_label(),
            full_value: format_percent(full),
            updated_by: updated_by.cloned().unwrap_or_default(),
            updated_date: updated_date.map(format_date).unwrap_or_default(),
            approved_by: threshold.approved_by.clone().unwrap_or_default(),
        }
    }
}

/// Fraction to whole percent, truncated toward zero (`0.755` -> `75%`).
fn format_percent(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{}%", (v * Decimal::ONE_HUNDRED).trunc().normalize()),
        None => "n/a".to_string(),
    }
}

fn format_date(ts: Timestamp) -> String {
    ts.format("%d %b %Y").to_string()
}

/// Renders the threshold summary e-mail body.
pub struct SummaryRenderer {
    registry: Handlebars<'static>,
}

impl SummaryRenderer {
    pub fn new() -> Result<Self, handlebars::TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(SUMMARY_TEMPLATE, SUMMARY_BODY)?;
        Ok(Self { registry })
    }

    pub fn subject(&self) -> &'static str {
        SUMMARY_SUBJECT
    }

    /// Render the HTML body listing every record in `changed`.
    pub fn render(&self, changed: &[Threshold]) -> Result<String, handlebars::RenderError> {
        let data = SummaryData {
            thresholds: changed.iter().map(SummaryEntry::from_threshold).collect(),
        };
        self.registry.render(SUMMARY_TEMPLATE, &data)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;

    use super::*;

    fn dec(s: &str) -> Option<Decimal> {
        Some(Decimal::from_str(s).unwrap())
    }

    fn group_threshold() -> Threshold {
        Threshold {
            id: 7,
            group_id: Some(12),
            threshold_type_id: ThresholdType::GROUP_ID,
            created_by: Some("admin".into()),
            created_date: Some(chrono::Utc.with_ymd_and_hms(2026, 1, 2, 8, 0, 0).unwrap()),
            updated_by: Some("carol".into()),
            updated_date: Some(chrono::Utc.with_ymd_and_hms(2026, 3, 9, 14, 30, 0).unwrap()),
            approved_by: Some("alice".into()),
            at_risk_threshold: dec("0.5000"),
            no_detection_threshold: dec("0.755"),
            in_warning_threshold: dec("0.1"),
            full_threshold: dec("0.2"),
        }
    }

    #[test]
    fn percent_truncates() {
        assert_eq!(format_percent(dec("0.755")), "75%");
        assert_eq!(format_percent(dec("0.5000")), "50%");
        assert_eq!(format_percent(dec("1")), "100%");
        assert_eq!(format_percent(dec("0")), "0%");
        assert_eq!(format_percent(None), "n/a");
    }

    #[test]
    fn group_entry_uses_group_pair() {
        let entry = SummaryEntry::from_threshold(&group_threshold());
        assert_eq!(entry.type_label, "Group");
        assert_eq!(entry.scope, "12");
        assert_eq!(entry.warning_label, "At Risk Of No Operator Available");
        assert_eq!(entry.warning_value, "50%");
        assert_eq!(entry.full_value, "75%");
        assert_eq!(entry.updated_date, "09 Mar 2026");
    }

    #[test]
    fn specialist_default_entry() {
        let mut t = group_threshold();
        t.threshold_type_id = ThresholdType::DETECTION_SPECIALIST_ID;
        t.group_id = None;
        let entry = SummaryEntry::from_threshold(&t);
        assert_eq!(entry.type_label, "Detection Specialist");
        assert_eq!(entry.scope, "Default");
        assert_eq!(entry.warning_label, "In Warning");
        assert_eq!(entry.warning_value, "10%");
        assert_eq!(entry.full_value, "20%");
    }

    #[test]
    fn inserted_record_falls_back_to_creation_stamp() {
        let mut t = group_threshold();
        t.updated_by = None;
        t.updated_date = None;
        let entry = SummaryEntry::from_threshold(&t);
        assert_eq!(entry.updated_by, "admin");
        assert_eq!(entry.updated_date, "02 Jan 2026");
    }

    #[test]
    fn renders_every_record() {
        let renderer = SummaryRenderer::new().unwrap();
        let mut second = group_threshold();
        second.group_id = Some(99);

        let html = renderer.render(&[group_threshold(), second]).unwrap();
        assert!(html.contains("<b>Threshold:</b> Group - 12"));
        assert!(html.contains("<b>Threshold:</b> Group - 99"));
        assert!(html.contains(
            "At Risk Of No Operator Available: 50% | No Operator Available: 75%"
        ));
        assert!(html.contains("<b>Approved By:</b> alice"));
        assert!(html.contains("Settings Page"));
    }

    #[test]
    fn escapes_free_text() {
        let renderer = SummaryRenderer::new().unwrap();
        let mut t = group_threshold();
        t.approved_by = Some("<script>".into());
        let html = renderer.render(&[t]).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn subject_is_fixed() {
        assert_eq!(SummaryRenderer::new().unwrap().subject(), "Thresholds Update");
    }
}
