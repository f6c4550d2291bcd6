use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::ParserConfig;
use crate::error::{Result, SubhdError};
use crate::subtitle::SearchCandidate;
use super::ResultBlockParser;

/// Result page parser for the subhd.com markup.
///
/// The page keeps its results as direct children of one container element.
/// Each child block links to its subtitle through an anchor like `/a/12345`
/// and carries a "format / version" line in its text.
pub struct SubhdResultParser {
    container: Selector,
    anchor: Selector,
    subtitle_href: Regex,
    info: Regex,
}

impl SubhdResultParser {
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let container = class_selector(&config.container_class)?;
        let anchor = Selector::parse("a")
            .map_err(|e| SubhdError::Config(format!("Invalid anchor selector: {:?}", e)))?;

        let subtitle_href = Regex::new(&config.subtitle_href_pattern).map_err(|e| {
            SubhdError::Config(format!(
                "Invalid subtitle href pattern '{}': {}",
                config.subtitle_href_pattern, e
            ))
        })?;

        let info_pattern = format!(
            r"{}\s*(\S+)\s+{}\s*([^\r\n]+)",
            regex::escape(&config.format_label),
            regex::escape(&config.version_label)
        );
        let info = Regex::new(&info_pattern)
            .map_err(|e| SubhdError::Config(format!("Invalid format/version labels: {}", e)))?;

        Ok(Self {
            container,
            anchor,
            subtitle_href,
            info,
        })
    }

    fn parse_block(&self, block: ElementRef<'_>) -> SearchCandidate {
        let mut candidate = SearchCandidate::default();

        for anchor in block.select(&self.anchor) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if let Some(caps) = self.subtitle_href.captures(href) {
                candidate.id = caps.get(1).map(|m| m.as_str().to_string());
                candidate.title = Some(anchor.text().collect::<String>().trim().to_string());
                break;
            }
        }

        // One line per text node, so the version stops at the end of its own element
        let text = block.text().collect::<Vec<_>>().join("\n");
        self.apply_info(&text, &mut candidate);
        candidate
    }

    fn apply_info(&self, text: &str, candidate: &mut SearchCandidate) {
        if let Some(caps) = self.info.captures(text) {
            candidate.format = caps.get(1).map(|m| m.as_str().to_string());
            candidate.version = caps.get(2).map(|m| m.as_str().trim().to_string());
        }
    }
}

impl ResultBlockParser for SubhdResultParser {
    fn parse_results(&self, html: &str) -> Vec<SearchCandidate> {
        let document = Html::parse_document(html);
        let Some(container) = document.select(&self.container).next() else {
            debug!("Result container not found in page");
            return Vec::new();
        };

        let mut candidates = Vec::new();
        for node in container.children() {
            let candidate = if let Some(block) = ElementRef::wrap(node) {
                self.parse_block(block)
            } else if let Some(text) = node.value().as_text() {
                // Stray text between blocks; only the format/version line can match
                if text.trim().is_empty() {
                    continue;
                }
                let mut candidate = SearchCandidate::default();
                self.apply_info(text, &mut candidate);
                candidate
            } else {
                continue;
            };

            if !candidate.is_empty() {
                candidates.push(candidate);
            }
        }

        debug!("Parsed {} candidates from result page", candidates.len());
        candidates
    }
}

/// Build a selector for an element carrying every class in `classes`
fn class_selector(classes: &str) -> Result<Selector> {
    let selector: String = classes
        .split_whitespace()
        .map(|class| format!(".{}", class))
        .collect();
    if selector.is_empty() {
        return Err(SubhdError::Config("Result container class is empty".to_string()));
    }

    Selector::parse(&selector)
        .map_err(|e| SubhdError::Config(format!("Invalid container class '{}': {:?}", classes, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english_config() -> ParserConfig {
        ParserConfig {
            format_label: "Format:".to_string(),
            version_label: "Version:".to_string(),
            ..ParserConfig::default()
        }
    }

    fn page(blocks: &str) -> String {
        format!(
            "<html><body><div class=\"row\"><div class=\"col-md-9\">{}</div>\
             <div class=\"col-md-3\"><a href=\"/a/999\">Sidebar</a></div></div></body></html>",
            blocks
        )
    }

    #[test]
    fn test_anchor_yields_id_and_title() {
        let parser = SubhdResultParser::new(&english_config()).unwrap();
        let html = page("<div class=\"box\"><a href=\"/a/12345\">Movie X</a></div>");

        let candidates = parser.parse_results(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id.as_deref(), Some("12345"));
        assert_eq!(candidates[0].title.as_deref(), Some("Movie X"));
        assert_eq!(candidates[0].format, None);
    }

    #[test]
    fn test_format_and_version_extracted() {
        let parser = SubhdResultParser::new(&english_config()).unwrap();
        let html = page(
            "<div class=\"box\"><a href=\"/a/7\">Show</a>\n<p>Format: srt Version: Director's Cut</p></div>",
        );

        let candidates = parser.parse_results(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].format.as_deref(), Some("srt"));
        assert_eq!(candidates[0].version.as_deref(), Some("Director's Cut"));
    }

    #[test]
    fn test_default_labels_match_site_text() {
        let parser = SubhdResultParser::new(&ParserConfig::default()).unwrap();
        let html = page(
            "<div><a href=\"/a/321\">权力的游戏 第一季</a>\
             <div>格式：ASS 版本：Game.of.Thrones.S01E01.720p.BluRay</div></div>",
        );

        let candidates = parser.parse_results(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id.as_deref(), Some("321"));
        assert_eq!(candidates[0].title.as_deref(), Some("权力的游戏 第一季"));
        assert_eq!(candidates[0].format.as_deref(), Some("ASS"));
        assert_eq!(candidates[0].version.as_deref(), Some("Game.of.Thrones.S01E01.720p.BluRay"));
    }

    #[test]
    fn test_version_stops_at_its_element() {
        let parser = SubhdResultParser::new(&ParserConfig::default()).unwrap();
        let html = page(
            "<div><a href=\"/a/321\">权力的游戏</a> <span>格式：ASS</span> \
             <span>版本：Game.of.Thrones.S01E01.720p</span> <span>下载次数：1024</span> \
             <span>上传者 bob</span></div>",
        );

        let candidates = parser.parse_results(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].format.as_deref(), Some("ASS"));
        assert_eq!(candidates[0].version.as_deref(), Some("Game.of.Thrones.S01E01.720p"));
    }

    #[test]
    fn test_labels_in_separate_elements() {
        let parser = SubhdResultParser::new(&english_config()).unwrap();
        let html = page(
            "<div><a href=\"/a/8\">Show</a><b>Format:</b><i>srt</i><b>Version:</b><i>Director's Cut</i><em>42 downloads</em></div>",
        );

        let candidates = parser.parse_results(&html);
        assert_eq!(candidates[0].format.as_deref(), Some("srt"));
        assert_eq!(candidates[0].version.as_deref(), Some("Director's Cut"));
    }

    #[test]
    fn test_document_order_preserved() {
        let parser = SubhdResultParser::new(&english_config()).unwrap();
        let html = page(
            "\n  <div><a href=\"/a/30\">Third</a></div>\n\
             <div><a href=\"/a/10\">First</a></div>\n\
             <div><a href=\"/a/20\">Second</a></div>\n",
        );

        let ids: Vec<_> = parser
            .parse_results(&html)
            .into_iter()
            .filter_map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["30", "10", "20"]);
    }

    #[test]
    fn test_block_without_match_is_dropped() {
        let parser = SubhdResultParser::new(&english_config()).unwrap();
        let html = page(
            "<div><a href=\"/u/55\">Uploader</a><span>nothing here</span></div>\
             <div><a href=\"/a/1\">Kept</a></div>\
             <nav><a href=\"/search/x?page=2\">2</a></nav>",
        );

        let candidates = parser.parse_results(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id.as_deref(), Some("1"));
    }

    #[test]
    fn test_first_matching_anchor_wins() {
        let parser = SubhdResultParser::new(&english_config()).unwrap();
        let html = page(
            "<div><a>no href</a><a href=\"/a/12/extra\">Nope</a>\
             <a href=\"/a/100\"> First </a><a href=\"/a/200\">Second</a></div>",
        );

        let candidates = parser.parse_results(&html);
        assert_eq!(candidates[0].id.as_deref(), Some("100"));
        assert_eq!(candidates[0].title.as_deref(), Some("First"));
    }

    #[test]
    fn test_text_only_block_is_kept() {
        let parser = SubhdResultParser::new(&english_config()).unwrap();
        let html = page("<div>Format: ass Version: WEB-DL</div>");

        let candidates = parser.parse_results(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, None);
        assert_eq!(candidates[0].format.as_deref(), Some("ass"));
        assert_eq!(candidates[0].version.as_deref(), Some("WEB-DL"));
    }

    #[test]
    fn test_missing_container_yields_empty() {
        let parser = SubhdResultParser::new(&english_config()).unwrap();

        assert!(parser.parse_results("<html><body><a href=\"/a/1\">x</a></body></html>").is_empty());
        assert!(parser.parse_results("").is_empty());
        assert!(parser.parse_results("<div class=\"col-md-9\"><<<</div").is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_pattern = ParserConfig {
            subtitle_href_pattern: "^/a/(\\d+$".to_string(),
            ..ParserConfig::default()
        };
        assert!(matches!(SubhdResultParser::new(&bad_pattern), Err(SubhdError::Config(_))));

        let empty_class = ParserConfig {
            container_class: "  ".to_string(),
            ..ParserConfig::default()
        };
        assert!(matches!(SubhdResultParser::new(&empty_class), Err(SubhdError::Config(_))));
    }

    #[test]
    fn test_custom_selectors() {
        let config = ParserConfig {
            container_class: "results list".to_string(),
            subtitle_href_pattern: r"^/subtitle/(\d+)\.html$".to_string(),
            ..english_config()
        };
        let parser = SubhdResultParser::new(&config).unwrap();
        let html = "<ul class=\"results list\"><li><a href=\"/subtitle/42.html\">Answer</a></li></ul>";

        let candidates = parser.parse_results(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id.as_deref(), Some("42"));
    }
}
