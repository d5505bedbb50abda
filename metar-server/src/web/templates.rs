//! Askama templates for raw report output.

use askama::Template;

/// Reports as `<pre>` blocks, one per line.
#[derive(Template)]
#[template(path = "reports.html")]
pub struct ReportsTemplate<'a> {
    pub reports: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(reports: &[&str]) -> String {
        let reports: Vec<String> = reports.iter().map(|r| r.to_string()).collect();
        ReportsTemplate { reports: &reports }.render().unwrap()
    }

    #[test]
    fn single_report() {
        assert_eq!(render(&["EGLL 181020Z 24012KT"]), "<pre>EGLL 181020Z 24012KT</pre>");
    }

    #[test]
    fn reports_joined_by_newlines() {
        assert_eq!(
            render(&["EGLL 181020Z", "KJFK 181051Z"]),
            "<pre>EGLL 181020Z</pre>\n<pre>KJFK 181051Z</pre>"
        );
    }

    #[test]
    fn report_text_is_escaped() {
        let html = render(&["RMK <b>&"]);
        assert!(html.contains("RMK &lt;b&gt;&amp;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn no_reports_renders_nothing() {
        assert_eq!(render(&[]), "");
    }
}
