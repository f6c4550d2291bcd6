use std::path::Path;
use std::sync::LazyLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What a guesser could tell about a release filename
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessedInfo {
    /// Show name, set when the name carries an episode marker
    pub series: Option<String>,
    /// Movie name otherwise
    pub title: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub year: Option<u32>,
    pub screen_size: Option<String>,
    pub container: Option<String>,
}

/// Derives metadata from a release filename
pub trait FilenameGuesser: Send + Sync {
    fn guess(&self, filename: &str) -> GuessedInfo;
}

const CONTAINERS: &[&str] = &[
    "mkv", "mp4", "avi", "m4v", "mov", "wmv", "flv", "ts", "m2ts", "rmvb", "webm", "mpg", "mpeg",
    "srt", "ass", "ssa", "sub", "idx",
];

const RELEASE_TAGS: &[&str] = &[
    "bluray", "blu-ray", "bdrip", "brrip", "dvdrip", "dvdscr", "hdtv", "hdrip", "webrip", "web-dl",
    "webdl", "hdcam", "remux", "x264", "x265", "h264", "h265", "hevc", "avc", "xvid", "divx",
    "aac", "ac3", "dts", "flac", "ddp5", "dd5", "10bit", "hdr", "proper", "repack", "internal",
    "limited", "extended", "unrated", "complete",
];

static EPISODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^s(\d{1,3})e(\d{1,4})(?:-?e\d{1,4})*$").expect("valid episode regex")
});
static CROSS_EPISODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2})x(\d{1,3})$").expect("valid episode regex"));
static SEASON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^s(\d{1,3})$").expect("valid season regex"));
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:19|20)\d{2}$").expect("valid year regex"));
static SCREEN_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\d{3,4}[pi]|4k|2160p|uhd)$").expect("valid resolution regex"));

/// Heuristic guesser for scene-style release names such as
/// `Show.Name.S01E02.720p.HDTV.x264-GROUP.mkv`.
///
/// Everything before the first release marker is the name.
#[derive(Debug, Clone, Default)]
pub struct ReleaseNameGuesser;

impl ReleaseNameGuesser {
    pub fn new() -> Self {
        Self
    }

    fn strip_container(name: &str) -> (&str, Option<String>) {
        if let Some((stem, ext)) = name.rsplit_once('.') {
            let ext = ext.to_lowercase();
            if CONTAINERS.contains(&ext.as_str()) {
                return (stem, Some(ext));
            }
        }
        (name, None)
    }

    fn is_release_tag(token: &str) -> bool {
        let lower = token.to_lowercase();
        // "x264-GROUP" style tokens carry the group name after the dash
        let head = lower.split('-').next().unwrap_or(lower.as_str());
        RELEASE_TAGS.contains(&lower.as_str()) || RELEASE_TAGS.contains(&head)
    }
}

impl FilenameGuesser for ReleaseNameGuesser {
    fn guess(&self, filename: &str) -> GuessedInfo {
        let base = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.to_string());
        let (stem, container) = Self::strip_container(&base);

        let cleaned: String = stem
            .chars()
            .map(|c| match c {
                '.' | '_' | '[' | ']' | '(' | ')' | '{' | '}' => ' ',
                c => c,
            })
            .collect();

        let mut info = GuessedInfo {
            container,
            ..GuessedInfo::default()
        };
        let mut name_tokens = Vec::new();
        let mut name_done = false;
        let mut is_episode = false;

        for token in cleaned.split_whitespace() {
            let episode = EPISODE_RE
                .captures(token)
                .or_else(|| CROSS_EPISODE_RE.captures(token));

            if let Some(caps) = episode {
                if info.episode.is_none() {
                    info.season = caps[1].parse().ok();
                    info.episode = caps[2].parse().ok();
                }
                is_episode = true;
            } else if let Some(caps) = SEASON_RE.captures(token) {
                if info.season.is_none() {
                    info.season = caps[1].parse().ok();
                }
                is_episode = true;
            } else if YEAR_RE.is_match(token) && !name_tokens.is_empty() {
                if info.year.is_none() {
                    info.year = token.parse().ok();
                }
            } else if SCREEN_SIZE_RE.is_match(token) {
                if info.screen_size.is_none() {
                    info.screen_size = Some(token.to_lowercase());
                }
            } else if Self::is_release_tag(token) {
                // no metadata of its own, still ends the name
            } else {
                if !name_done && token != "-" {
                    name_tokens.push(token);
                }
                continue;
            }
            name_done = true;
        }

        let name = name_tokens.join(" ");
        if !name.is_empty() {
            if is_episode {
                info.series = Some(name);
            } else {
                info.title = Some(name);
            }
        }

        debug!("Guessed {:?} from '{}'", info, filename);
        info
    }
}

/// Turns user input into the keyword sent to the search endpoint
pub struct QueryNormalizer {
    guesser: Box<dyn FilenameGuesser>,
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::new(Box::new(ReleaseNameGuesser::new()))
    }
}

impl QueryNormalizer {
    pub fn new(guesser: Box<dyn FilenameGuesser>) -> Self {
        Self { guesser }
    }

    /// Keyword for `input`.
    ///
    /// Filenames are reduced to the guessed series (or movie title); when the
    /// guesser finds neither the keyword is empty.
    pub fn normalize(&self, input: &str, is_filename: bool) -> String {
        if !is_filename {
            return input.to_string();
        }

        let info = self.guesser.guess(input);
        match info.series.or(info.title) {
            Some(keyword) => keyword,
            None => {
                warn!("Could not guess a series or title from '{}'", input);
                String::new()
            }
        }
    }
}
