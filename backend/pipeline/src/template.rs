//! Caption templates with `{{placeholder}}` substitution.
//!
//! Known placeholders: `description`, `app`, `user`, `project`, `date`,
//! `latitude`, `longitude`, `timestamp`, `orientation`. Anything else is left
//! in place verbatim.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use geovision_core::ParsedKeyMetadata;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").unwrap());

pub fn render_caption(template: &str, description: &str, metadata: &ParsedKeyMetadata) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "description" => description.to_string(),
            "app" => metadata.app.clone(),
            "user" => metadata.user.clone(),
            "project" => metadata.project.clone(),
            "date" => metadata.date.clone(),
            "latitude" => metadata.latitude.clone(),
            "longitude" => metadata.longitude.clone(),
            "timestamp" => metadata.timestamp.clone(),
            "orientation" => metadata.orientation.to_string(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geovision_core::{CompassLabel, Direction};

    fn metadata() -> ParsedKeyMetadata {
        ParsedKeyMetadata {
            app: "geo".into(),
            user: "u1".into(),
            project: "barn".into(),
            date: "2025-06-17".into(),
            latitude: "41.9291".into(),
            longitude: "-71.4518".into(),
            timestamp: "June 17, 2025 at 01:51 PM UTC".into(),
            orientation: CompassLabel {
                direction: Direction::East,
                degrees: 90,
            },
        }
    }

    #[test]
    fn substitutes_known_placeholders() {
        let out = render_caption(
            "{{timestamp}} facing {{ orientation }} at ({{latitude}}, {{longitude}}): {{description}}",
            "A red barn.",
            &metadata(),
        );
        assert_eq!(
            out,
            "June 17, 2025 at 01:51 PM UTC facing East (90°) at (41.9291, -71.4518): A red barn."
        );
    }

    #[test]
    fn leaves_unknown_placeholders() {
        let out = render_caption("{{camera}} / {{project}}", "x", &metadata());
        assert_eq!(out, "{{camera}} / barn");
    }

    #[test]
    fn description_is_not_reexpanded() {
        let out = render_caption("{{description}}", "literal {{date}}", &metadata());
        assert_eq!(out, "literal {{date}}");
    }
}
